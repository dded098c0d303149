use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format used for date-time literals and bound date-time text.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A literal value carried by a `Constant` node or a bound parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Decimal / floating point
    Decimal(f64),
    /// String
    String(String),
    /// Date-time (no zone)
    DateTime(NaiveDateTime),
    /// Sequence of values
    List(Vec<Value>),
}

/// The declared type of a constant, as the caller knows it.
///
/// Mostly inferred from the value itself. It matters when the value alone is
/// ambiguous: an empty list, or a string that is really a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Boolean,
    String,
    Integer,
    Decimal,
    DateTime,
    Null,
    List(Box<DeclaredType>),
    Unknown,
}

impl DeclaredType {
    /// Element types whose sequences are joined as quoted text in an `IN (...)` list.
    pub fn is_quoted(&self) -> bool {
        matches!(self, DeclaredType::String | DeclaredType::DateTime)
    }

    /// Element type of a list type.
    pub fn element(&self) -> Option<&DeclaredType> {
        match self {
            DeclaredType::List(inner) => Some(inner),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclaredType::Boolean => write!(f, "boolean"),
            DeclaredType::String => write!(f, "string"),
            DeclaredType::Integer => write!(f, "integer"),
            DeclaredType::Decimal => write!(f, "decimal"),
            DeclaredType::DateTime => write!(f, "datetime"),
            DeclaredType::Null => write!(f, "null"),
            DeclaredType::List(inner) => write!(f, "list<{}>", inner),
            DeclaredType::Unknown => write!(f, "unknown"),
        }
    }
}

impl Value {
    /// Infer the declared type from the value. Lists take the type of their first item.
    pub fn declared_type(&self) -> DeclaredType {
        match self {
            Value::Null => DeclaredType::Null,
            Value::Bool(_) => DeclaredType::Boolean,
            Value::Int(_) => DeclaredType::Integer,
            Value::Decimal(_) => DeclaredType::Decimal,
            Value::String(_) => DeclaredType::String,
            Value::DateTime(_) => DeclaredType::DateTime,
            Value::List(items) => DeclaredType::List(Box::new(
                items
                    .first()
                    .map(Value::declared_type)
                    .unwrap_or(DeclaredType::Unknown),
            )),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `NULL` itself, or a decimal with no SQL representation (`NaN`, infinities).
    pub fn is_sql_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Decimal(n) => !n.is_finite(),
            _ => false,
        }
    }
}

/// Default textual representation. Literal syntax lives in the formatter.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Decimal(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Value::List(items) => {
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Decimal(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_inference() {
        assert_eq!(Value::from(3).declared_type(), DeclaredType::Integer);
        assert_eq!(
            Value::from(vec!["a", "b"]).declared_type(),
            DeclaredType::List(Box::new(DeclaredType::String))
        );
        assert_eq!(
            Value::List(vec![]).declared_type(),
            DeclaredType::List(Box::new(DeclaredType::Unknown))
        );
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_display_is_plain_text() {
        assert_eq!(Value::from("O'Brien").to_string(), "O'Brien");
        assert_eq!(Value::from(vec![1, 2, 3]).to_string(), "1,2,3");
        assert_eq!(DeclaredType::List(Box::new(DeclaredType::DateTime)).to_string(), "list<datetime>");
    }
}
