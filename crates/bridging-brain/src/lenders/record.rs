use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::borrow::Cow;

/// Attribute key that every catalogue record carries.
pub const NAME_KEY: &str = "name";

/// Scalar cell value taken from a questionnaire export.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Blank,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Classifies a raw spreadsheet cell. Blank, `nan` and `none` cells are absent.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("none")
        {
            return Self::Blank;
        }

        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Blank => Cow::Borrowed(""),
            Self::Number(number) => Cow::Owned(format_number(*number)),
            Self::Text(text) => Cow::Borrowed(text.as_str()),
        }
    }

    /// Lower-cased, trimmed text used by the substring predicates.
    pub fn folded(&self) -> String {
        self.as_text().trim().to_lowercase()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::from_raw(value)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Blank => serializer.serialize_none(),
            Self::Number(number) => serializer.serialize_f64(*number),
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

/// Immutable lender profile keyed by cleaned questionnaire headers.
///
/// Attribute order follows the export's column order, which the schema adapter
/// relies on when several keys match the same logical field.
#[derive(Debug, Clone, PartialEq)]
pub struct LenderRecord {
    name: String,
    attributes: Vec<(String, CellValue)>,
}

impl LenderRecord {
    /// Builds a record from ordered attributes. Returns `None` without a non-blank `name`.
    pub fn from_attributes(attributes: Vec<(String, CellValue)>) -> Option<Self> {
        let name = attributes
            .iter()
            .find(|(key, _)| key == NAME_KEY)
            .map(|(_, value)| value.as_text().trim().to_string())
            .filter(|name| !name.is_empty())?;

        Some(Self { name, attributes })
    }

    /// Convenience constructor over raw string pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let attributes = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), CellValue::from_raw(value.as_ref())))
            .collect();
        Self::from_attributes(attributes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact-key lookup. Use the schema adapter for logical field names.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.attributes
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl Serialize for LenderRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len()))?;
        for (key, value) in &self.attributes {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
