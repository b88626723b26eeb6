use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use clap::ValueEnum;
use comfy_table::{presets, Row, Table};
use glob::{glob_with, MatchOptions};

use crate::config::SourceSpec;
use crate::extract::{
    default_column, resolve_columns, ColumnExtractor, Extractor,
    FixedLabelExtractor,
};
use crate::label::{Label, LabelMapping, LabelValues};
use crate::normalized::{NormalizedWriter, WriteMode};
use crate::prelude::*;
use crate::prompt::Prompt;
use crate::raw::{read_text_file, sqlite_tables, RawFormat, RawTable};
use crate::review::{self, Outcome, Session, Sink};
use crate::review_log::ReviewLog;

const NUM_SAMPLES: usize = 5;
const MAX_MANUAL_VALUES: usize = 25;

/// What to do with a source that already has a normalized file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExistingMode {
    /// Append, skipping records that were already reviewed.
    Resume,
    /// Append and review all records again.
    Append,
    /// Discard the normalized file and the review log.
    Overwrite,
    /// Leave the source untouched.
    Skip,
}

#[derive(Debug, Default)]
pub(crate) struct NormalizerOptions {
    /// Never prompt; use defaults and confirm labelled candidates.
    pub(crate) unattended: bool,

    /// Preselected handling of existing normalized files.
    pub(crate) existing: Option<ExistingMode>,

    /// Don't print per-file summaries.
    pub(crate) quiet: bool,
}

/// Drives the normalization of raw files, one source at a time.
pub(crate) struct Normalizer<'a, P: Prompt + ?Sized> {
    project: &'a mut Project,
    prompt: &'a mut P,
    options: NormalizerOptions,
}

/// Collects the raw files below `paths`, grouped by source.
///
/// Directories are searched recursively; files with an unsupported
/// extension are ignored there, but rejected if named explicitly.
pub(crate) fn collect_sources(
    raw_dir: &Path,
    paths: &[PathBuf],
) -> ClaimsetResult<BTreeMap<String, Vec<PathBuf>>> {
    let mut sources: BTreeMap<String, BTreeSet<PathBuf>> =
        BTreeMap::new();

    for path in paths {
        if !path.exists() {
            return Err(ClaimsetError::InputNotFound(path.into()));
        }

        let files: Vec<PathBuf> = if path.is_dir() {
            let pattern = format!("{}/**/*", path.display());
            glob_with(&pattern, MatchOptions::default())
                .map_err(ClaimsetError::other)?
                .filter_map(Result::ok)
                .filter(|p| {
                    p.is_file() && RawFormat::from_path(p).is_some()
                })
                .collect()
        } else if RawFormat::from_path(path).is_some() {
            vec![path.clone()]
        } else {
            bail!("unsupported file format: {}", path.display());
        };

        for file in files {
            let (source, _) = source_of(raw_dir, &file);
            sources.entry(source).or_default().insert(file);
        }
    }

    Ok(sources
        .into_iter()
        .map(|(source, files)| (source, files.into_iter().collect()))
        .collect())
}

/// Returns the source name of a raw file and the key of the file
/// within the source.
///
/// Files in a sub-directory of the raw directory belong to the source
/// named like the sub-directory; any other file is a source on its
/// own, named like the file stem.
pub(crate) fn source_of(
    raw_dir: &Path,
    file: &Path,
) -> (String, String) {
    let file_name = file
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let Ok(rel) = file.strip_prefix(raw_dir) else {
        return (stem, file_name);
    };

    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => {
                Some(s.to_string_lossy().to_string())
            }
            _ => None,
        })
        .collect();

    if parts.len() < 2 {
        return (stem, file_name);
    }

    (parts[0].clone(), parts[1..].join("/"))
}

impl<'a, P: Prompt + ?Sized> Normalizer<'a, P> {
    pub(crate) fn new(
        project: &'a mut Project,
        prompt: &'a mut P,
        options: NormalizerOptions,
    ) -> Self {
        Self {
            project,
            prompt,
            options,
        }
    }

    /// Normalizes the raw files of all sources below `paths`.
    pub(crate) fn run(
        &mut self,
        paths: &[PathBuf],
    ) -> ClaimsetResult<()> {
        let raw_dir = self.project.raw_dir();
        let sources = collect_sources(&raw_dir, paths)?;

        if sources.is_empty() {
            log::warn!("no raw files found");
            return Ok(());
        }

        for (source, files) in sources.iter() {
            let outcome =
                self.normalize_source(&raw_dir, source, files)?;
            if outcome == Outcome::Quit {
                log::info!("review stopped by operator");
                break;
            }
        }

        Ok(())
    }

    /// Normalizes all raw files of a single source.
    pub(crate) fn normalize_source(
        &mut self,
        raw_dir: &Path,
        source: &str,
        files: &[PathBuf],
    ) -> ClaimsetResult<Outcome> {
        let out = self.project.normalized_path(source);
        let mut reviews =
            ReviewLog::load(self.project.state_path(source))?;

        let mode = if out.is_file() {
            self.existing_mode(source, &reviews)?
        } else {
            if reviews.len() > 0 {
                reviews.clear()?;
            }
            ExistingMode::Append
        };

        let (write_mode, resume) = match mode {
            ExistingMode::Skip => {
                log::info!("skipping source '{source}'");
                return Ok(Outcome::Completed);
            }
            ExistingMode::Overwrite => {
                reviews.clear()?;
                (WriteMode::Truncate, false)
            }
            ExistingMode::Resume => (WriteMode::Append, true),
            ExistingMode::Append => (WriteMode::Append, false),
        };

        let vocab = self.project.config().labels.clone();
        let mut writer =
            NormalizedWriter::open(&out, &vocab, write_mode)?;

        for path in files {
            let (_, file) = source_of(raw_dir, path);
            self.prompt.show(&format!(
                "\nProcessing: {} (source = {source})",
                path.display()
            ));

            let table = match self.load_table(source, &file, path) {
                Ok(table) => table,
                Err(e) => {
                    log::error!(
                        "could not read {}: {e}",
                        path.display()
                    );
                    continue;
                }
            };

            if table.columns().is_empty() {
                log::warn!(
                    "skipping {}: no valid columns found",
                    path.display()
                );
                continue;
            }

            let Some(extractor) = self.extractor(source, &file, &table)?
            else {
                continue;
            };
            let mut session =
                Session::new(resume, self.options.unattended);
            let mut sink = Sink {
                writer: &mut writer,
                log: &mut reviews,
            };

            let outcome = review::review(
                &mut *self.prompt,
                &mut session,
                &mut sink,
                &file,
                &table,
                extractor.as_ref(),
            )?;

            if !self.options.quiet {
                self.prompt.show(&summary(&file, &session));
            }

            if outcome == Outcome::Quit {
                return Ok(Outcome::Quit);
            }
        }

        log::info!(
            "saved {} record(s) to {}",
            writer.written(),
            writer.path().display()
        );

        Ok(Outcome::Completed)
    }

    fn existing_mode(
        &mut self,
        source: &str,
        reviews: &ReviewLog,
    ) -> ClaimsetResult<ExistingMode> {
        let reviewed = reviews.len();
        if let Some(mode) = self.options.existing {
            return Ok(match mode {
                ExistingMode::Resume if reviewed == 0 => {
                    ExistingMode::Append
                }
                mode => mode,
            });
        }

        if self.options.unattended {
            return Ok(if reviewed > 0 {
                ExistingMode::Resume
            } else {
                ExistingMode::Skip
            });
        }

        let mut modes = vec![];
        if reviewed > 0 {
            modes.push((
                ExistingMode::Resume,
                format!("Resume ({reviewed} record(s) reviewed)"),
            ));
        }
        modes.push((ExistingMode::Append, "Append".into()));
        modes.push((ExistingMode::Overwrite, "Overwrite".into()));
        modes.push((ExistingMode::Skip, "Skip source".into()));

        let items: Vec<String> =
            modes.iter().map(|(_, item)| item.clone()).collect();
        let choice = self.prompt.select(
            &format!("Source '{source}' is already normalized"),
            &items,
            0,
        )?;

        Ok(modes[choice].0)
    }

    fn load_table(
        &mut self,
        source: &str,
        file: &str,
        path: &Path,
    ) -> ClaimsetResult<RawTable> {
        let spec = self
            .project
            .config()
            .source_spec(source, file)
            .cloned()
            .unwrap_or_default();

        let Some(format) = RawFormat::from_path(path) else {
            bail!("unsupported file format: {}", path.display());
        };

        let table = match format {
            RawFormat::Sqlite => {
                let table = match spec.table {
                    Some(table) => table,
                    None => self.select_table(path)?,
                };

                self.prompt.show(&format!("Loading table: {table}"));
                RawTable::from_sqlite(path, &table)?
            }
            format => {
                let delimiter = match spec.delimiter {
                    Some(c) if c.is_ascii() => Some(c as u8),
                    Some(c) => bail!("invalid delimiter '{c}'"),
                    None => None,
                };

                read_text_file(path, format, delimiter)?
            }
        };

        let malformed = table.num_malformed();
        if malformed > 0 {
            log::warn!(
                "{}: {malformed} of {} record(s) are malformed",
                path.display(),
                table.len()
            );
        }

        Ok(table)
    }

    fn select_table(&mut self, path: &Path) -> ClaimsetResult<String> {
        let mut tables = sqlite_tables(path)?;
        if tables.is_empty() {
            bail!("no tables found in {}", path.display());
        }

        if tables.len() == 1 || self.options.unattended {
            return Ok(tables.swap_remove(0));
        }

        self.prompt
            .show(&index_table("Available tables", tables.as_slice()));
        let choice = self.prompt.select("Select table", &tables, 0)?;
        Ok(tables.swap_remove(choice))
    }

    /// Builds the extractor of a raw file, either from the config or
    /// from the operator's choice of columns. Returns `None` if the
    /// configured rule doesn't fit the file.
    fn extractor(
        &mut self,
        source: &str,
        file: &str,
        table: &RawTable,
    ) -> ClaimsetResult<Option<Box<dyn Extractor>>> {
        let configured =
            self.project.config().source_spec(source, file).cloned();

        if let Some(spec) = configured.as_ref() {
            if !spec.claim.is_empty() {
                let rule = match resolve_rule(table, spec) {
                    Ok(rule) => rule,
                    Err(e) => {
                        log::error!(
                            "{source}/{file}: invalid rule: {e}"
                        );
                        return Ok(None);
                    }
                };

                return Ok(Some(match rule {
                    (claim, LabelSource::Fixed(label)) => {
                        Box::new(FixedLabelExtractor::new(claim, label))
                    }
                    (claim, LabelSource::Column(label)) => {
                        let mapping = if spec.labels.is_empty() {
                            self.label_mapping(table, &claim, label)?
                        } else {
                            spec.labels.clone().into_iter().collect()
                        };

                        Box::new(ColumnExtractor::new(
                            claim, label, mapping,
                        ))
                    }
                }));
            }
        }

        self.prompt.show(&format!(
            "Columns detected: {}",
            table.columns().join(", ")
        ));

        let claim = self.select_column(table, "claim", None)?;
        let fixed = format!("<same label for every record of {file}>");
        let label =
            self.select_column(table, "label", Some(fixed.as_str()))?;
        let label = (label < table.columns().len()).then_some(label);

        // keep the reading options (delimiter, table) of the source
        let mut spec = SourceSpec {
            claim: vec![table.columns()[claim].clone()],
            label: None,
            fixed_label: None,
            labels: Default::default(),
            ..configured.unwrap_or_default()
        };

        let extractor: Box<dyn Extractor> = match label {
            Some(label) => {
                let mapping =
                    self.label_mapping(table, &[claim], label)?;
                spec.label = Some(table.columns()[label].clone());
                spec.labels = mapping
                    .iter()
                    .map(|(value, label)| (value.to_string(), label))
                    .collect();

                Box::new(ColumnExtractor::new(
                    vec![claim],
                    label,
                    mapping,
                ))
            }
            None => {
                let items: Vec<String> = [Label::True, Label::Fake]
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                let choice = self.prompt.select("Label", &items, 0)?;
                let label = match choice {
                    0 => Label::True,
                    _ => Label::Fake,
                };

                spec.fixed_label = Some(label);
                Box::new(FixedLabelExtractor::new(vec![claim], label))
            }
        };

        self.save_spec(source, file, spec)?;
        Ok(Some(extractor))
    }

    /// Lets the operator choose a column. If `extra` is given, it is
    /// offered as an additional item after the last column.
    fn select_column(
        &mut self,
        table: &RawTable,
        kind: &str,
        extra: Option<&str>,
    ) -> ClaimsetResult<usize> {
        let default = default_column(table, kind);
        if self.options.unattended {
            return Ok(default);
        }

        let title = format!("Available columns for {kind}");
        self.prompt.show(&index_table(&title, table.columns()));

        let mut items = table.columns().to_vec();
        if let Some(extra) = extra {
            items.push(extra.to_string());
        }

        let prompt = format!("Select column for {kind}");
        self.prompt.select(&prompt, &items, default)
    }

    fn save_spec(
        &mut self,
        source: &str,
        file: &str,
        spec: SourceSpec,
    ) -> ClaimsetResult<()> {
        if self.options.unattended || !self.project.config().exists() {
            return Ok(());
        }

        let key = format!("{source}/{file}");
        let prompt =
            format!("Save this rule for '{key}' to the config?");
        if self.prompt.confirm(&prompt, true)? {
            let config = self.project.config_mut();
            config.sources.insert(key, spec);
            config.save()?;
        }

        Ok(())
    }

    /// Determines the mapping of raw label values. Well-known values
    /// are mapped automatically, binary values after confirmation and
    /// everything else by hand.
    fn label_mapping(
        &mut self,
        table: &RawTable,
        claim: &[usize],
        label: usize,
    ) -> ClaimsetResult<LabelMapping> {
        let values = table.distinct(label);
        let listed: Vec<&str> = values
            .iter()
            .take(MAX_MANUAL_VALUES)
            .map(String::as_str)
            .collect();
        let more = if values.len() > listed.len() {
            ", ..."
        } else {
            ""
        };

        self.prompt.show(&format!(
            "\nUnique label values ({}): [{}{more}]",
            values.len(),
            listed.join(", ")
        ));

        if !self.options.quiet {
            self.prompt.show("Sample records:");
            for record in table.sample(NUM_SAMPLES) {
                let text: Vec<&str> = claim
                    .iter()
                    .filter_map(|idx| record.get(*idx))
                    .collect();
                let text = textwrap::fill(&text.join(" "), 100);
                self.prompt.show(&format!(
                    "  -> {}\n     => {}",
                    textwrap::indent(&text, "     ").trim_start(),
                    record.get(label).unwrap_or_default()
                ));
            }
        }

        match LabelMapping::infer(&values) {
            LabelValues::Textual(mapping) => {
                self.prompt.show(&format!(
                    "Detected textual labels, applying mapping: {}",
                    describe(&mapping)
                ));
                Ok(mapping)
            }
            LabelValues::Binary(mut mapping) => {
                self.prompt.show(&distribution(table, label));
                self.prompt
                    .show("Preview mapping: 1 -> true, 0 -> fake");

                if !self.options.unattended
                    && !self
                        .prompt
                        .confirm("Does this look correct?", true)?
                {
                    mapping.flip();
                    self.prompt
                        .show("Flipped labels: 1 -> fake, 0 -> true");
                }

                Ok(mapping)
            }
            LabelValues::Unknown => {
                let mut mapping = LabelMapping::default();
                if self.options.unattended {
                    log::warn!(
                        "unknown label values, leaving them unmapped"
                    );
                    return Ok(mapping);
                }

                if values.len() > MAX_MANUAL_VALUES
                    && !self.prompt.confirm(
                        &format!(
                            "Map {} distinct values by hand?",
                            values.len()
                        ),
                        false,
                    )?
                {
                    return Ok(mapping);
                }

                let items: Vec<String> = vec![
                    Label::True.to_string(),
                    Label::Fake.to_string(),
                    "leave unmapped".into(),
                ];

                for value in values.iter() {
                    let prompt = format!("  {value} ->");
                    match self.prompt.select(&prompt, &items, 2)? {
                        0 => mapping.insert(value, Label::True),
                        1 => mapping.insert(value, Label::Fake),
                        _ => continue,
                    }
                }

                if mapping.is_empty() {
                    self.prompt.show("No label remapping applied.");
                } else {
                    let text = format!(
                        "Remapped labels: {}",
                        describe(&mapping)
                    );
                    self.prompt.show(&text);
                }

                Ok(mapping)
            }
        }
    }
}

enum LabelSource {
    Column(usize),
    Fixed(Label),
}

/// Resolves the columns named by a configured rule.
fn resolve_rule(
    table: &RawTable,
    spec: &SourceSpec,
) -> ClaimsetResult<(Vec<usize>, LabelSource)> {
    let claim = resolve_columns(table, &spec.claim)?;
    if let Some(label) = spec.fixed_label {
        return Ok((claim, LabelSource::Fixed(label)));
    }

    let Some(ref name) = spec.label else {
        bail!("no label column or fixed label");
    };

    let label = resolve_columns(table, std::slice::from_ref(name))?;
    Ok((claim, LabelSource::Column(label[0])))
}

fn describe(mapping: &LabelMapping) -> String {
    mapping
        .iter()
        .map(|(value, label)| format!("{value} = {label}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn index_table<S: AsRef<str>>(title: &str, names: &[S]) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(Row::from(vec!["index", "name"]));

    for (idx, name) in names.iter().enumerate() {
        table.add_row(vec![idx.to_string(), name.as_ref().to_string()]);
    }

    format!("{title}:\n{table}")
}

fn distribution(table: &RawTable, label: usize) -> String {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in table.valid() {
        let value = record.get(label).unwrap_or_default().trim();
        *counts.entry(value.to_string()).or_default() += 1;
    }

    let mut out = Table::new();
    out.load_preset(presets::UTF8_FULL_CONDENSED);
    out.set_header(Row::from(vec!["label", "count"]));
    for (value, count) in counts {
        out.add_row(vec![value, count.to_string()]);
    }

    format!("Label distribution:\n{out}")
}

fn summary(file: &str, session: &Session) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(Row::from(vec![
        "file",
        "confirmed",
        "skipped",
        "malformed",
        "resumed",
    ]));
    table.add_row(vec![
        file.to_string(),
        session.confirmed.to_string(),
        session.skipped.to_string(),
        session.malformed.to_string(),
        session.resumed.to_string(),
    ]);

    table.to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rusqlite::Connection;

    use super::*;
    use crate::label::LabelVocab;
    use crate::normalized::{NormalizedFile, NormalizedRecord};
    use crate::prompt::scripted::{Answer, ScriptedPrompt};
    use crate::review_log::Decision;

    type TestResult = anyhow::Result<()>;

    fn project_with_config(dir: &Path, config: &str) -> Project {
        fs::write(dir.join(Config::FILENAME), config).unwrap();
        Project::open(dir).unwrap()
    }

    const METADATA: &str =
        "[metadata]\nname = \"test\"\nversion = \"0.1.0\"\n";

    fn normalized(
        project: &Project,
        source: &str,
    ) -> Vec<NormalizedRecord> {
        NormalizedFile::from_path(
            project.normalized_path(source),
            &LabelVocab::default(),
        )
        .unwrap()
        .records
    }

    #[test]
    fn source_names() {
        let raw = Path::new("/data/raw");
        assert_eq!(
            source_of(raw, Path::new("/data/raw/liar/train.tsv")),
            ("liar".into(), "train.tsv".into())
        );
        assert_eq!(
            source_of(raw, Path::new("/data/raw/isot/v1/Fake.csv")),
            ("isot".into(), "v1/Fake.csv".into())
        );
        assert_eq!(
            source_of(raw, Path::new("/data/raw/covid.csv")),
            ("covid".into(), "covid.csv".into())
        );
        assert_eq!(
            source_of(raw, Path::new("/elsewhere/fever.jsonl")),
            ("fever".into(), "fever.jsonl".into())
        );
    }

    #[test]
    fn collect() -> TestResult {
        let dir = tempfile::tempdir()?;
        let raw = dir.path().join("raw");
        fs::create_dir_all(raw.join("isot"))?;
        fs::write(raw.join("isot/True.csv"), "title,text\n")?;
        fs::write(raw.join("isot/Fake.csv"), "title,text\n")?;
        fs::write(raw.join("isot/README.md"), "# isot\n")?;
        fs::write(raw.join("covid.csv"), "claim,label\n")?;

        let sources = collect_sources(&raw, &[raw.clone()])?;
        assert_eq!(sources.len(), 2);
        assert_eq!(sources["covid"], vec![raw.join("covid.csv")]);
        assert_eq!(
            sources["isot"],
            vec![raw.join("isot/Fake.csv"), raw.join("isot/True.csv")]
        );

        assert!(matches!(
            collect_sources(&raw, &[raw.join("missing")]),
            Err(ClaimsetError::InputNotFound(_))
        ));
        let readme = raw.join("isot/README.md");
        assert!(collect_sources(&raw, &[readme]).is_err());
        Ok(())
    }

    #[test]
    fn interactive_column_selection() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut project = project_with_config(dir.path(), METADATA);
        let raw = project.raw_dir();
        fs::create_dir_all(&raw)?;
        fs::write(
            raw.join("politifact.csv"),
            "id,statement,verdict\n1,a,pants-fire\n2,b,true\n\
            3,c,half-true\n4,d;x\n",
        )?;

        let mut prompt = ScriptedPrompt::new(vec![
            Answer::Select(1),     // claim column
            Answer::Select(2),     // label column
            Answer::Select(1),     // half-true -> fake
            Answer::Select(1),     // pants-fire -> fake
            Answer::Select(0),     // true -> true
            Answer::Confirm(true), // save rule
            Answer::Select(0),     // confirm a
            Answer::Select(3),     // skip b
            Answer::Select(0),     // confirm c
        ]);

        Normalizer::new(&mut project, &mut prompt, Default::default())
            .run(&[raw.clone()])?;

        assert_eq!(
            normalized(&project, "politifact"),
            vec![
                NormalizedRecord::new("a", Label::Fake),
                NormalizedRecord::new("c", Label::Fake),
            ]
        );

        let config =
            Config::from_path(dir.path().join(Config::FILENAME))?;
        let spec =
            config.source_spec("politifact", "politifact.csv").unwrap();
        assert_eq!(spec.claim, vec!["statement"]);
        assert_eq!(spec.label.as_deref(), Some("verdict"));
        assert_eq!(spec.labels.get("pants-fire"), Some(&Label::Fake));
        assert_eq!(spec.labels.get("true"), Some(&Label::True));

        let log = ReviewLog::load(project.state_path("politifact"))?;
        let decision = |row| log.get("politifact.csv", row);
        assert_eq!(decision(2), Some(Decision::Skipped));
        assert_eq!(decision(4), Some(Decision::Malformed));
        Ok(())
    }

    #[test]
    fn configured_fixed_labels() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut project = project_with_config(
            dir.path(),
            &format!(
                "{METADATA}\n\
                [sources.\"isot/Fake.csv\"]\n\
                claim = [\"title\", \"text\"]\n\
                fixed-label = \"fake\"\n\n\
                [sources.\"isot/True.csv\"]\n\
                claim = [\"title\"]\n\
                fixed-label = \"true\"\n"
            ),
        );

        let raw = project.raw_dir();
        fs::create_dir_all(raw.join("isot"))?;
        fs::write(raw.join("isot/Fake.csv"), "title,text\nA,b\nC,d\n")?;
        fs::write(raw.join("isot/True.csv"), "title,text\nE,f\n")?;

        let mut prompt = ScriptedPrompt::default();
        let options = NormalizerOptions {
            unattended: true,
            ..Default::default()
        };

        Normalizer::new(&mut project, &mut prompt, options)
            .run(&[raw.clone()])?;

        assert_eq!(
            normalized(&project, "isot"),
            vec![
                NormalizedRecord::new("A b", Label::Fake),
                NormalizedRecord::new("C d", Label::Fake),
                NormalizedRecord::new("E", Label::True),
            ]
        );
        assert!(prompt.prompts.is_empty());
        Ok(())
    }

    #[test]
    fn binary_labels_flipped() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut project = Project::open(dir.path())?;
        let raw = project.raw_dir();
        fs::create_dir_all(&raw)?;
        fs::write(raw.join("covid.csv"), "claim,label\nx,1\ny,0\n")?;

        let mut prompt = ScriptedPrompt::new(vec![
            Answer::Select(0),      // claim column
            Answer::Select(1),      // label column
            Answer::Confirm(false), // flip
            Answer::Select(4),      // accept all
        ]);

        Normalizer::new(&mut project, &mut prompt, Default::default())
            .run(&[raw.join("covid.csv")])?;

        assert_eq!(
            normalized(&project, "covid"),
            vec![
                NormalizedRecord::new("x", Label::Fake),
                NormalizedRecord::new("y", Label::True),
            ]
        );
        Ok(())
    }

    #[test]
    fn existing_output_modes() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut project = Project::open(dir.path())?;
        let raw = project.raw_dir();
        fs::create_dir_all(&raw)?;
        fs::write(
            raw.join("covid.csv"),
            "claim,label\nx,true\ny,fake\n",
        )?;

        let unattended = |existing| NormalizerOptions {
            unattended: true,
            existing,
            quiet: true,
        };

        let mut prompt = ScriptedPrompt::default();
        Normalizer::new(&mut project, &mut prompt, unattended(None))
            .run(&[raw.clone()])?;
        assert_eq!(normalized(&project, "covid").len(), 2);

        // already reviewed: resuming adds nothing
        Normalizer::new(&mut project, &mut prompt, unattended(None))
            .run(&[raw.clone()])?;
        assert_eq!(normalized(&project, "covid").len(), 2);

        let options = unattended(Some(ExistingMode::Append));
        Normalizer::new(&mut project, &mut prompt, options)
            .run(&[raw.clone()])?;
        assert_eq!(normalized(&project, "covid").len(), 4);

        let options = unattended(Some(ExistingMode::Overwrite));
        Normalizer::new(&mut project, &mut prompt, options)
            .run(&[raw.clone()])?;
        assert_eq!(normalized(&project, "covid").len(), 2);

        fs::write(raw.join("covid.csv"), "claim,label\nz,true\n")?;
        let options = unattended(Some(ExistingMode::Skip));
        Normalizer::new(&mut project, &mut prompt, options)
            .run(&[raw.clone()])?;
        assert_eq!(normalized(&project, "covid").len(), 2);
        Ok(())
    }

    #[test]
    fn sqlite_source() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut project = Project::open(dir.path())?;
        let raw = project.raw_dir();
        fs::create_dir_all(&raw)?;

        let conn = Connection::open(raw.join("news.db"))?;
        conn.execute_batch(
            "CREATE TABLE a (x TEXT);
            CREATE TABLE news (claim TEXT, label TEXT);
            INSERT INTO news VALUES ('foo', 'fake'), ('bar', 'real');",
        )?;
        drop(conn);

        let mut prompt = ScriptedPrompt::new(vec![
            Answer::Select(1), // table "news"
            Answer::Select(0), // claim column
            Answer::Select(1), // label column
            Answer::Select(0), // confirm foo
            Answer::Select(0), // confirm bar
        ]);

        Normalizer::new(&mut project, &mut prompt, Default::default())
            .run(&[raw.clone()])?;

        assert_eq!(
            normalized(&project, "news"),
            vec![
                NormalizedRecord::new("foo", Label::Fake),
                NormalizedRecord::new("bar", Label::True),
            ]
        );
        Ok(())
    }

    #[test]
    fn saved_rule_keeps_source_options() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut project = project_with_config(
            dir.path(),
            &format!(
                "{METADATA}\n[sources.liar]\ndelimiter = \"\\t\"\n"
            ),
        );

        let raw = project.raw_dir();
        fs::create_dir_all(raw.join("liar"))?;
        fs::write(
            raw.join("liar/train.tsv"),
            "id\tstatement, text\tverdict\n\
             1\tx, y\tfalse\n\
             2\tz\ttrue\n",
        )?;

        let mut prompt = ScriptedPrompt::new(vec![
            Answer::Select(1),     // claim column
            Answer::Select(2),     // label column
            Answer::Confirm(true), // save rule
            Answer::Select(0),     // confirm "x, y"
            Answer::Select(0),     // confirm z
        ]);

        Normalizer::new(&mut project, &mut prompt, Default::default())
            .run(&[raw.clone()])?;
        assert_eq!(normalized(&project, "liar").len(), 2);

        let config =
            Config::from_path(dir.path().join(Config::FILENAME))?;
        let spec = config.source_spec("liar", "train.tsv").unwrap();
        assert_eq!(spec.claim, vec!["statement, text"]);
        assert_eq!(spec.delimiter, Some('\t'));

        let mut project = Project::open(dir.path())?;
        let mut prompt = ScriptedPrompt::default();
        let options = NormalizerOptions {
            unattended: true,
            existing: Some(ExistingMode::Append),
            quiet: true,
        };

        Normalizer::new(&mut project, &mut prompt, options)
            .run(&[raw.clone()])?;

        assert_eq!(
            normalized(&project, "liar"),
            vec![
                NormalizedRecord::new("x, y", Label::Fake),
                NormalizedRecord::new("z", Label::True),
                NormalizedRecord::new("x, y", Label::Fake),
                NormalizedRecord::new("z", Label::True),
            ]
        );
        Ok(())
    }

    #[test]
    fn invalid_rule_skips_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut project = project_with_config(
            dir.path(),
            &format!(
                "{METADATA}\n\
                [sources.\"isot/Fake.csv\"]\n\
                claim = [\"headline\"]\n\
                fixed-label = \"fake\"\n\n\
                [sources.\"isot/True.csv\"]\n\
                claim = [\"title\"]\n\
                fixed-label = \"true\"\n\n\
                [sources.covid]\n\
                claim = [\"claim\"]\n"
            ),
        );

        let raw = project.raw_dir();
        fs::create_dir_all(raw.join("isot"))?;
        fs::write(raw.join("isot/Fake.csv"), "title\nA\n")?;
        fs::write(raw.join("isot/True.csv"), "title\nE\n")?;
        fs::write(raw.join("covid.csv"), "claim,label\nx,true\n")?;

        let mut prompt = ScriptedPrompt::default();
        let options = NormalizerOptions {
            unattended: true,
            ..Default::default()
        };

        Normalizer::new(&mut project, &mut prompt, options)
            .run(&[raw.clone()])?;

        assert_eq!(
            normalized(&project, "isot"),
            vec![NormalizedRecord::new("E", Label::True)]
        );
        assert!(normalized(&project, "covid").is_empty());
        Ok(())
    }
}
