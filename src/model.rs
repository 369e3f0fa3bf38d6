use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{GenError, Result};

/// One instruction record of the description file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpcodeSpec {
    /// Handler identifier emitted as the dispatch target.
    pub name: String,
    /// Fields, most-significant first. Widths must sum to 16.
    pub pattern: Vec<Field>,
}

/// One contiguous bit segment of an instruction word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Field {
    pub bits: u32,
    /// Diagnostic label ("Size", "Source Register", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<Vec<u16>>,
    #[serde(default)]
    pub swapped: bool,
    /// Raw value (as a decimal string key) to emitted label.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "unique_mapping")]
    pub mapping: Option<BTreeMap<String, Label>>,
    #[serde(default)]
    pub exclude_template: bool,
    #[serde(default)]
    pub force_template: bool,
}

/// Replacement emitted for a mapped field value: usually a type name such as
/// `uint16_t`, occasionally a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(v) => write!(f, "{v}"),
            Label::Text(s) => f.write_str(s),
        }
    }
}

/// Like the plain map impl, but a key given twice is an error instead of
/// letting the last one win.
fn unique_mapping<'de, D>(d: D) -> std::result::Result<Option<BTreeMap<String, Label>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct UniqueKeys;

    impl<'de> Visitor<'de> for UniqueKeys {
        type Value = BTreeMap<String, Label>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map from raw values to labels")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
            let mut out = BTreeMap::new();
            while let Some((key, label)) = access.next_entry::<String, Label>()? {
                if out.contains_key(&key) {
                    return Err(de::Error::custom(format_args!("duplicate mapping key {key:?}")));
                }
                out.insert(key, label);
            }
            Ok(out)
        }
    }

    d.deserialize_map(UniqueKeys).map(Some)
}

impl Field {
    pub fn new(bits: u32) -> Self {
        Self { bits, ..Self::default() }
    }

    pub fn fixed(bits: u32, value: u32) -> Self {
        Self::new(bits).valid([value])
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn valid(mut self, values: impl IntoIterator<Item = u32>) -> Self {
        self.valid = Some(values.into_iter().collect());
        self
    }

    pub fn modes(mut self, selectors: impl IntoIterator<Item = u16>) -> Self {
        self.modes = Some(selectors.into_iter().collect());
        self
    }

    pub fn swapped(mut self) -> Self {
        self.swapped = true;
        self
    }

    pub fn exclude(mut self) -> Self {
        self.exclude_template = true;
        self
    }

    pub fn force(mut self) -> Self {
        self.force_template = true;
        self
    }

    pub fn mapping<'a>(mut self, pairs: impl IntoIterator<Item = (u16, &'a str)>) -> Self {
        self.mapping = Some(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), Label::Text(v.to_string())))
                .collect(),
        );
        self
    }
}

impl OpcodeSpec {
    pub fn new(name: &str, pattern: Vec<Field>) -> Self {
        Self { name: name.to_string(), pattern }
    }
}

/// Parses a JSON array of opcode records. Unknown or missing keys are errors.
pub fn parse_opcodes(text: &str) -> Result<Vec<OpcodeSpec>> {
    Ok(serde_json::from_str(text)?)
}

pub fn load_opcodes(path: &Path) -> Result<Vec<OpcodeSpec>> {
    let text = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
    parse_opcodes(&text)
}
