use crate::label::{Label, LabelMapping};
use crate::prelude::*;
use crate::raw::{RawRecord, RawTable};

/// A claim proposed to the operator. The label is missing if the raw
/// value has no mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub(crate) claim: String,
    pub(crate) label: Option<Label>,
    pub(crate) raw_label: Option<String>,
}

/// Turns a raw record of a source into a [Candidate].
pub(crate) trait Extractor {
    fn extract(&self, record: &RawRecord) -> ClaimsetResult<Candidate>;
}

/// Takes the label from a column and maps its raw values.
#[derive(Debug)]
pub(crate) struct ColumnExtractor {
    claim: Vec<usize>,
    label: usize,
    mapping: LabelMapping,
}

impl ColumnExtractor {
    pub(crate) fn new(
        claim: Vec<usize>,
        label: usize,
        mapping: LabelMapping,
    ) -> Self {
        Self {
            claim,
            label,
            mapping,
        }
    }
}

impl Extractor for ColumnExtractor {
    fn extract(&self, record: &RawRecord) -> ClaimsetResult<Candidate> {
        let claim = claim_text(record, &self.claim)?;
        let Some(raw) = record.get(self.label) else {
            return Err(ClaimsetError::malformed(
                record.row,
                "missing label value",
            ));
        };

        Ok(Candidate {
            claim,
            label: self.mapping.get(raw),
            raw_label: Some(raw.trim().to_string()),
        })
    }
}

/// Assigns the same label to every record, for sources that ship one
/// file per class.
#[derive(Debug)]
pub(crate) struct FixedLabelExtractor {
    claim: Vec<usize>,
    label: Label,
}

impl FixedLabelExtractor {
    pub(crate) fn new(claim: Vec<usize>, label: Label) -> Self {
        Self { claim, label }
    }
}

impl Extractor for FixedLabelExtractor {
    fn extract(&self, record: &RawRecord) -> ClaimsetResult<Candidate> {
        Ok(Candidate {
            claim: claim_text(record, &self.claim)?,
            label: Some(self.label),
            raw_label: None,
        })
    }
}

/// Joins the claim columns and collapses whitespace, so that every
/// claim fits on a single line.
fn claim_text(
    record: &RawRecord,
    columns: &[usize],
) -> ClaimsetResult<String> {
    let mut parts = vec![];
    for idx in columns {
        let Some(value) = record.get(*idx) else {
            return Err(ClaimsetError::malformed(
                record.row,
                format!("missing claim column {idx}"),
            ));
        };

        parts.extend(value.split_whitespace());
    }

    if parts.is_empty() {
        return Err(ClaimsetError::malformed(record.row, "empty claim"));
    }

    Ok(parts.join(" "))
}

/// Resolves column names to indices.
pub(crate) fn resolve_columns(
    table: &RawTable,
    names: &[String],
) -> ClaimsetResult<Vec<usize>> {
    names
        .iter()
        .map(|name| {
            table.position(name).ok_or_else(|| {
                ClaimsetError::other(format!("unknown column '{name}'"))
            })
        })
        .collect()
}

/// The column preselected for `kind`: a column named like `kind`,
/// otherwise the first (claim) or second (label) column.
pub(crate) fn default_column(table: &RawTable, kind: &str) -> usize {
    if let Some(idx) = table.position(kind) {
        return idx;
    }

    match kind {
        "label" if table.columns().len() > 1 => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    type TestResult = anyhow::Result<()>;

    fn record(values: &[&str]) -> RawRecord {
        let values = values.iter().map(|s| s.to_string()).collect();
        RawRecord::new(7, values)
    }

    #[test]
    fn column_extractor() -> TestResult {
        let mut mapping = LabelMapping::default();
        mapping.insert("pants-fire", Label::Fake);

        let extractor = ColumnExtractor::new(vec![1], 2, mapping);
        let candidate = extractor.extract(&record(&[
            "1",
            " the  moon\nis cheese ",
            "Pants-Fire",
        ]))?;

        assert_eq!(candidate.claim, "the moon is cheese");
        assert_eq!(candidate.label, Some(Label::Fake));
        assert_eq!(candidate.raw_label.as_deref(), Some("Pants-Fire"));

        let candidate =
            extractor.extract(&record(&["2", "x", "half-true"]))?;
        assert_eq!(candidate.label, None);
        Ok(())
    }

    #[test]
    fn fixed_label_extractor() -> TestResult {
        let extractor =
            FixedLabelExtractor::new(vec![0, 1], Label::True);
        let candidate =
            extractor.extract(&record(&["Title", "body text"]))?;

        assert_eq!(candidate.claim, "Title body text");
        assert_eq!(candidate.label, Some(Label::True));
        Ok(())
    }

    #[test]
    fn empty_claim_is_malformed() {
        let extractor = FixedLabelExtractor::new(vec![0], Label::Fake);
        assert!(matches!(
            extractor.extract(&record(&["   ", "x"])),
            Err(ClaimsetError::MalformedRecord { row: 7, .. })
        ));

        let extractor =
            ColumnExtractor::new(vec![0], 5, Default::default());
        assert!(extractor.extract(&record(&["x"])).is_err());
    }

    #[test]
    fn columns() -> TestResult {
        let table = RawTable::from_delimited(
            Cursor::new("id,Statement,verdict\n1,x,true\n"),
            None,
        )?;

        assert_eq!(
            resolve_columns(&table, &["statement".into()])?,
            vec![1]
        );
        assert!(resolve_columns(&table, &["text".into()]).is_err());
        assert_eq!(default_column(&table, "claim"), 0);
        assert_eq!(default_column(&table, "label"), 1);

        let table = RawTable::from_delimited(
            Cursor::new("text,label,claim\n"),
            None,
        )?;
        assert_eq!(default_column(&table, "claim"), 2);
        assert_eq!(default_column(&table, "label"), 1);
        Ok(())
    }
}
