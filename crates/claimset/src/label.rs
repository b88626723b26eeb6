use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// The two-valued classification of a claim.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Label {
    /// The claim is not misinformation.
    True,
    /// The claim is misinformation.
    Fake,
}

impl Label {
    #[inline]
    pub(crate) fn flip(self) -> Self {
        match self {
            Self::True => Self::Fake,
            Self::Fake => Self::True,
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::Fake => write!(f, "fake"),
        }
    }
}

impl FromStr for Label {
    type Err = ClaimsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" => Ok(Self::True),
            "fake" => Ok(Self::Fake),
            _ => bail!("invalid label '{s}'"),
        }
    }
}

/// The values written to normalized files and the combined dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LabelVocab {
    #[serde(rename = "true")]
    pub(crate) truthful: String,

    #[serde(rename = "fake")]
    pub(crate) fake: String,
}

impl Default for LabelVocab {
    fn default() -> Self {
        Self {
            truthful: "1".into(),
            fake: "0".into(),
        }
    }
}

impl LabelVocab {
    /// Returns the on-disk value of `label`.
    #[inline]
    pub(crate) fn encode(&self, label: Label) -> &str {
        match label {
            Label::True => &self.truthful,
            Label::Fake => &self.fake,
        }
    }

    /// Parses an on-disk value; `None` if it isn't part of the
    /// vocabulary.
    pub(crate) fn decode(&self, value: &str) -> Option<Label> {
        let value = value.trim();
        if value == self.truthful {
            Some(Label::True)
        } else if value == self.fake {
            Some(Label::Fake)
        } else {
            None
        }
    }

    pub(crate) fn validate(&self) -> ClaimsetResult<()> {
        let truthful = self.truthful.as_str();
        let fake = self.fake.as_str();

        if truthful.trim().is_empty() || fake.trim().is_empty() {
            bail!("label values must not be empty");
        }

        for value in [truthful, fake] {
            if value.trim() != value {
                bail!(
                    "label value '{value}' has surrounding whitespace"
                );
            }
        }

        if truthful == fake {
            bail!("label values must differ (both are '{truthful}')");
        }

        Ok(())
    }
}

const TRUE_WORDS: &[&str] =
    &["true", "real", "1", "yes", "genuine", "legit", "reliable"];
const FAKE_WORDS: &[&str] = &[
    "fake",
    "false",
    "0",
    "no",
    "hoax",
    "misinformation",
    "unreliable",
];

/// Maps raw label values of a source onto [Label]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LabelMapping {
    map: BTreeMap<String, Label>,
}

/// The kind of raw label values found in a source.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LabelValues {
    /// Only `0` and `1`; `1 = true, 0 = fake` is a guess the operator
    /// has to confirm.
    Binary(LabelMapping),
    /// Every value is a well-known word.
    Textual(LabelMapping),
    /// At least one value has no known meaning.
    Unknown,
}

impl LabelMapping {
    #[inline]
    fn key(value: &str) -> String {
        value.trim().to_lowercase()
    }

    pub(crate) fn insert(&mut self, value: &str, label: Label) {
        self.map.insert(Self::key(value), label);
    }

    #[inline]
    pub(crate) fn get(&self, value: &str) -> Option<Label> {
        self.map.get(&Self::key(value)).copied()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Swaps true and fake for every mapped value.
    pub(crate) fn flip(&mut self) {
        self.map.values_mut().for_each(|label| *label = label.flip());
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, Label)> {
        self.map.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Classifies the distinct raw values of a label column.
    pub(crate) fn infer(values: &BTreeSet<String>) -> LabelValues {
        let keys: BTreeSet<String> =
            values.iter().map(|v| Self::key(v)).collect();

        if keys.is_empty() {
            return LabelValues::Unknown;
        }

        if keys.iter().all(|k| k == "0" || k == "1") {
            let mut mapping = Self::default();
            mapping.insert("1", Label::True);
            mapping.insert("0", Label::Fake);
            return LabelValues::Binary(mapping);
        }

        let mut mapping = Self::default();
        for key in keys.iter() {
            if TRUE_WORDS.contains(&key.as_str()) {
                mapping.insert(key, Label::True);
            } else if FAKE_WORDS.contains(&key.as_str()) {
                mapping.insert(key, Label::Fake);
            } else {
                return LabelValues::Unknown;
            }
        }

        LabelValues::Textual(mapping)
    }
}

impl FromIterator<(String, Label)> for LabelMapping {
    fn from_iter<T: IntoIterator<Item = (String, Label)>>(
        iter: T,
    ) -> Self {
        let mut mapping = Self::default();
        for (value, label) in iter {
            mapping.insert(&value, label);
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    fn values(xs: &[&str]) -> BTreeSet<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn label_from_str() -> TestResult {
        assert_eq!(Label::from_str("true")?, Label::True);
        assert_eq!(Label::from_str(" Fake ")?, Label::Fake);
        assert!(Label::from_str("maybe").is_err());
        Ok(())
    }

    #[test]
    fn label_to_string() {
        assert_eq!(Label::True.to_string(), "true");
        assert_eq!(Label::Fake.to_string(), "fake");
        assert_eq!(Label::True.flip(), Label::Fake);
    }

    #[test]
    fn vocab_encode_decode() {
        let vocab = LabelVocab::default();
        assert_eq!(vocab.encode(Label::True), "1");
        assert_eq!(vocab.encode(Label::Fake), "0");
        assert_eq!(vocab.decode(" 1"), Some(Label::True));
        assert_eq!(vocab.decode("0"), Some(Label::Fake));
        assert_eq!(vocab.decode("2"), None);
    }

    #[test]
    fn vocab_validate() {
        assert!(LabelVocab::default().validate().is_ok());

        let vocab = LabelVocab {
            truthful: "x".into(),
            fake: "x".into(),
        };
        assert!(vocab.validate().is_err());

        let vocab = LabelVocab {
            truthful: "".into(),
            fake: "x".into(),
        };
        assert!(vocab.validate().is_err());

        let vocab = LabelVocab {
            truthful: " yes".into(),
            fake: "no".into(),
        };
        assert!(vocab.validate().is_err());
        assert_eq!(vocab.decode(" yes"), None);
    }

    #[test]
    fn vocab_partial_table() -> TestResult {
        let vocab: LabelVocab = toml::from_str("fake = \"hoax\"")?;
        assert_eq!(vocab.truthful, "1");
        assert_eq!(vocab.fake, "hoax");
        assert!(vocab.validate().is_ok());
        Ok(())
    }

    #[test]
    fn infer_binary() {
        let LabelValues::Binary(mut mapping) =
            LabelMapping::infer(&values(&["0", "1", " 1"]))
        else {
            panic!("expected binary labels");
        };

        assert_eq!(mapping.get("1"), Some(Label::True));
        assert_eq!(mapping.get("0"), Some(Label::Fake));

        mapping.flip();
        assert_eq!(mapping.get("1"), Some(Label::Fake));
        assert_eq!(mapping.get("0"), Some(Label::True));
    }

    #[test]
    fn infer_textual() {
        let LabelValues::Textual(mapping) =
            LabelMapping::infer(&values(&["TRUE", "Fake", "real"]))
        else {
            panic!("expected textual labels");
        };

        assert_eq!(mapping.get("true"), Some(Label::True));
        assert_eq!(mapping.get("REAL"), Some(Label::True));
        assert_eq!(mapping.get("fake"), Some(Label::Fake));
        assert_eq!(mapping.get("pants-fire"), None);
    }

    #[test]
    fn infer_unknown() {
        assert_eq!(
            LabelMapping::infer(&values(&["true", "pants-fire"])),
            LabelValues::Unknown
        );
        assert_eq!(
            LabelMapping::infer(&values(&[])),
            LabelValues::Unknown
        );
    }
}
