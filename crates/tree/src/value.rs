//! Property values.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fmt;
use time::UtcDateTime;
use time::format_description::well_known::Rfc3339;

/// A property value as stored in the content tree.
///
/// Single-valued reads ([`string`](Self::string), [`date`](Self::date), ...)
/// convert between representations where the conversion is lossless and
/// return [`ValueFormat`](ErrorKind::ValueFormat) otherwise. Reading a
/// [`Multiple`](Self::Multiple) value as a single value is always an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Date(UtcDateTime),
    Multiple(Vec<Value>),
}

impl Value {
    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    /// The textual form of a single value. Dates are formatted as RFC 3339.
    pub fn string(&self) -> Result<String> {
        match self {
            Self::String(s) => Ok(s.clone()),
            Self::Long(l) => Ok(l.to_string()),
            Self::Double(d) => Ok(d.to_string()),
            Self::Boolean(b) => Ok(b.to_string()),
            Self::Date(d) => d.format(&Rfc3339).or_raise(|| ErrorKind::ValueFormat("date".to_string())),
            Self::Multiple(_) => exn::bail!(ErrorKind::ValueFormat("multi-valued property".to_string())),
        }
    }

    /// Dates read as milliseconds since the Unix epoch.
    pub fn long(&self) -> Result<i64> {
        match self {
            Self::Long(l) => Ok(*l),
            Self::String(s) => s.trim().parse::<i64>().or_raise(|| ErrorKind::ValueFormat(s.clone())),
            Self::Date(d) => {
                let millis = d.unix_timestamp_nanos() / 1_000_000;
                i64::try_from(millis).or_raise(|| ErrorKind::ValueFormat("date".to_string()))
            },
            other => exn::bail!(ErrorKind::ValueFormat(other.kind().to_string())),
        }
    }

    pub fn boolean(&self) -> Result<bool> {
        match self {
            Self::Boolean(b) => Ok(*b),
            Self::String(s) => Ok(s.eq_ignore_ascii_case("true")),
            other => exn::bail!(ErrorKind::ValueFormat(other.kind().to_string())),
        }
    }

    pub fn date(&self) -> Result<UtcDateTime> {
        match self {
            Self::Date(d) => Ok(*d),
            Self::String(s) => UtcDateTime::parse(s, &Rfc3339).or_raise(|| ErrorKind::ValueFormat(s.clone())),
            other => exn::bail!(ErrorKind::ValueFormat(other.kind().to_string())),
        }
    }

    /// All values of the property; a single value yields a slice of one.
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Multiple(values) => values,
            single => std::slice::from_ref(single),
        }
    }

    /// Textual forms of all values.
    pub fn strings(&self) -> Result<Vec<String>> {
        self.values().iter().map(Value::string).collect()
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Multiple(_) => "multi-valued property",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Multiple(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            },
            single => match single.string() {
                Ok(s) => f.write_str(&s),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
impl From<UtcDateTime> for Value {
    fn from(value: UtcDateTime) -> Self {
        Self::Date(value)
    }
}
impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(values: Vec<V>) -> Self {
        Self::Multiple(values.into_iter().map(Into::into).collect())
    }
}
