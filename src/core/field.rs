//! Field value types used to build column assignments

use crate::core::invoice::InvoiceStatus;
use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

/// A column value, bound as a single SQL parameter
///
/// Client-supplied columns travel as text and are converted by the column's
/// SQL type when written. `None` binds SQL `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Status(Option<InvoiceStatus>),
}

impl FieldValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Text(v) => v.is_none(),
            FieldValue::Status(v) => v.is_none(),
        }
    }
}

/// SQL type of a writable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Varchar(usize),
    Text,
    Date,
    Numeric { precision: u32, scale: u32 },
}

impl ColumnType {
    /// Explicit cast applied to a text parameter bound for this column
    pub const fn cast(self) -> &'static str {
        match self {
            ColumnType::Date => "::date",
            ColumnType::Numeric { .. } => "::numeric",
            ColumnType::Varchar(_) | ColumnType::Text => "",
        }
    }
}

/// Any JSON scalar from a request body, kept as the text sent to the datastore
///
/// Strings pass through unchanged, numbers and booleans use their JSON
/// spelling, arrays and objects are serialized back to JSON. Wrap in
/// `Option` (or [`Patch`]) so `null` stays distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputText(String);

impl InputText {
    /// Render a JSON value; `None` for `null`
    pub fn from_json(value: &Value) -> Option<Self> {
        let text = match value {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_text(n),
            Value::Array(_) | Value::Object(_) => value.to_string(),
        };
        Some(InputText(text))
    }
}

/// Integral floats drop the fraction (`100.0` becomes `100`)
fn number_text(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 1e21 {
                return format!("{f:.0}");
            }
            return f.to_string();
        }
    }
    n.to_string()
}

impl AsRef<str> for InputText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InputText {
    fn from(value: &str) -> Self {
        InputText(value.to_string())
    }
}

impl From<String> for InputText {
    fn from(value: String) -> Self {
        InputText(value)
    }
}

impl From<InputText> for String {
    fn from(value: InputText) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for InputText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        InputText::from_json(&value)
            .ok_or_else(|| de::Error::invalid_type(de::Unexpected::Unit, &"a JSON scalar"))
    }
}

/// A request field that distinguishes "absent" from an explicit `null`
///
/// Use together with `#[serde(default)]`: a missing key deserializes to
/// [`Patch::Absent`], `null` to [`Patch::Null`], anything else to
/// [`Patch::Value`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    /// True when the key was present in the request body, even as `null`
    pub fn is_present(&self) -> bool {
        !matches!(self, Patch::Absent)
    }

    /// `None` when absent, `Some(None)` for null, `Some(Some(v))` for a value
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}
