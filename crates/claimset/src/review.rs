use console::style;

use crate::extract::{Candidate, Extractor};
use crate::label::Label;
use crate::normalized::{NormalizedRecord, NormalizedWriter};
use crate::prelude::*;
use crate::prompt::Prompt;
use crate::raw::RawTable;
use crate::review_log::{Decision, ReviewLog};

const WRAP_WIDTH: usize = 100;

const ACTIONS: [&str; 6] = [
    "Confirm",
    "Edit claim",
    "Change label",
    "Skip",
    "Accept all remaining",
    "Quit",
];

const LABELS: [Label; 2] = [Label::True, Label::Fake];

/// The state of the review of one raw file, passed explicitly through
/// the review loop.
#[derive(Debug, Default)]
pub(crate) struct Session {
    /// Don't re-present records which are already in the review log.
    pub(crate) resume: bool,

    /// Never prompt: confirm labelled candidates, skip the others.
    pub(crate) unattended: bool,

    /// Confirm labelled candidates without prompting.
    pub(crate) accept_all: bool,

    pub(crate) confirmed: usize,
    pub(crate) skipped: usize,
    pub(crate) malformed: usize,
    pub(crate) resumed: usize,
}

impl Session {
    pub(crate) fn new(resume: bool, unattended: bool) -> Self {
        Self {
            resume,
            unattended,
            accept_all: unattended,
            ..Default::default()
        }
    }

    /// The number of decisions taken in this session.
    #[inline]
    pub(crate) fn reviewed(&self) -> usize {
        self.confirmed + self.skipped + self.malformed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Completed,
    Quit,
}

/// Where the results of a review go.
///
/// A confirmed row is written and flushed before its review log entry.
/// If the process dies in between, the row is on disk but not logged,
/// and a resumed review presents the record once more.
pub(crate) struct Sink<'a> {
    pub(crate) writer: &'a mut NormalizedWriter,
    pub(crate) log: &'a mut ReviewLog,
}

impl Sink<'_> {
    fn confirm(
        &mut self,
        file: &str,
        row: usize,
        claim: String,
        label: Label,
    ) -> ClaimsetResult<()> {
        self.writer.write(&NormalizedRecord::new(claim, label))?;
        self.log.record(file, row, Decision::Confirmed)
    }
}

/// Walks the records of a raw file and lets the operator confirm,
/// edit or skip every candidate.
///
/// Malformed records and records without a usable claim are reported
/// and skipped. Errors of the prompt or the sink abort the review;
/// everything confirmed up to that point is already on disk.
pub(crate) fn review<P: Prompt + ?Sized>(
    prompt: &mut P,
    session: &mut Session,
    sink: &mut Sink<'_>,
    file: &str,
    table: &RawTable,
    extractor: &dyn Extractor,
) -> ClaimsetResult<Outcome> {
    let total = table.len();

    for (idx, record) in table.records().iter().enumerate() {
        let row = match record {
            Ok(record) => record.row,
            Err(ClaimsetError::MalformedRecord { row, .. }) => *row,
            Err(_) => idx + 1,
        };

        if session.resume && sink.log.contains(file, row) {
            session.resumed += 1;
            continue;
        }

        let candidate = match record {
            Ok(record) => extractor.extract(record),
            Err(e) => Err(ClaimsetError::other(e)),
        };

        let mut candidate = match candidate {
            Ok(candidate) => candidate,
            Err(e) => {
                log::warn!("{file}: skipping record: {e}");
                session.malformed += 1;
                sink.log.record(file, row, Decision::Malformed)?;
                continue;
            }
        };

        loop {
            if session.accept_all {
                if let Some(label) = candidate.label {
                    sink.confirm(file, row, candidate.claim, label)?;
                    session.confirmed += 1;
                    break;
                }

                if session.unattended {
                    log::info!(
                        "{file}: skipping row {row}: no label for '{}'",
                        candidate.raw_label.unwrap_or_default()
                    );
                    sink.log.record(file, row, Decision::Skipped)?;
                    session.skipped += 1;
                    break;
                }
            }

            let text = render(&candidate, idx + 1, total, row, session);
            prompt.show(&text);

            let items: Vec<String> =
                ACTIONS.iter().map(ToString::to_string).collect();
            match prompt.select("Action", &items, 0)? {
                0 => match candidate.label {
                    Some(label) => {
                        sink.confirm(
                            file,
                            row,
                            candidate.claim,
                            label,
                        )?;
                        session.confirmed += 1;
                        break;
                    }
                    None => {
                        prompt.show("The candidate has no label yet.");
                    }
                },
                1 => {
                    let text = prompt.input("Claim", &candidate.claim)?;
                    let text = text
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .join(" ");
                    if text.is_empty() {
                        prompt.show("The claim must not be empty.");
                    } else {
                        candidate.claim = text;
                    }
                }
                2 => {
                    let default = match candidate.label {
                        Some(Label::True) => 1,
                        _ => 0,
                    };

                    let items: Vec<String> = LABELS
                        .iter()
                        .map(ToString::to_string)
                        .collect();
                    let choice =
                        prompt.select("Label", &items, default)?;
                    candidate.label = Some(LABELS[choice]);
                }
                3 => {
                    sink.log.record(file, row, Decision::Skipped)?;
                    session.skipped += 1;
                    break;
                }
                4 => {
                    session.accept_all = true;
                }
                _ => return Ok(Outcome::Quit),
            }
        }
    }

    Ok(Outcome::Completed)
}

fn render(
    candidate: &Candidate,
    pos: usize,
    total: usize,
    row: usize,
    session: &Session,
) -> String {
    let header = format!(
        "Record {pos}/{total} (row = {row}, confirmed = {})",
        session.confirmed
    );

    let claim = textwrap::indent(
        &textwrap::fill(&candidate.claim, WRAP_WIDTH),
        "    ",
    );

    let label = match candidate.label {
        Some(label) => style(label.to_string()).magenta().bold(),
        None => style("<unmapped>".to_string()).red().bold(),
    };

    let raw = match candidate.raw_label {
        Some(ref raw) => format!(" (raw = '{raw}')"),
        None => String::new(),
    };

    format!(
        "\n{header}\n{}\n{}\n  => {label}{raw}\n",
        "~".repeat(header.len()),
        style(claim).cyan()
    )
}
