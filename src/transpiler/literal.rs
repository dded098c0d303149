//! Literal formatting.
//!
//! Values are rendered into T-SQL literal syntax. String and date text is
//! interpolated as-is, without escaping embedded quotes: callers that handle
//! untrusted text should compile through [`LiteralChannel::Bound`] instead.
//! Non-finite decimals render as `NULL`.

use crate::ast::{DATETIME_FORMAT, DeclaredType, Value};
use crate::transpiler::params::ParamContext;

/// Stateless renderer of literal values.
pub struct LiteralFormatter;

impl LiteralFormatter {
    /// Render a value as an inline SQL literal.
    pub fn format(value: &Value, declared: &DeclaredType) -> String {
        match (value, declared) {
            (v, _) if v.is_sql_null() => "NULL".to_string(),
            (Value::Bool(b), _) => (if *b { "1" } else { "0" }).to_string(),
            (Value::DateTime(_), _) | (Value::String(_), DeclaredType::DateTime) => {
                format!("CAST('{}' AS DATE)", Self::raw_text(value))
            }
            (Value::String(s), _) => format!("'{}'", s),
            (Value::List(items), _) => {
                let element = Self::element_type(items, declared);
                let rendered: Vec<String> = items.iter().map(|v| Self::format(v, &element)).collect();
                format!("({})", rendered.join(", "))
            }
            (other, DeclaredType::String) => format!("'{}'", other),
            (other, _) => other.to_string(),
        }
    }

    /// Render `<field> = <value>` in one step. Used by the `equals` call translation.
    pub fn format_equality(field: &str, value: &Value, declared: &DeclaredType) -> String {
        format!("{} = {}", field, Self::format(value, declared))
    }

    /// Render the inside of an `IN (...)` list.
    ///
    /// Quoted element types are joined with `',' ` and wrapped in one pair of
    /// quotes, so `["a", "b"]` becomes `'a',' b'`. Everything else is rendered
    /// per item and joined with a bare comma.
    pub fn format_in_list(items: &[Value], element: &DeclaredType) -> String {
        if element.is_quoted() {
            let texts: Vec<String> = items.iter().map(Self::raw_text).collect();
            format!("'{}'", texts.join("',' "))
        } else {
            let rendered: Vec<String> = items.iter().map(|v| Self::format(v, element)).collect();
            rendered.join(",")
        }
    }

    /// Element type of a list constant: the declared one, else inferred from the items.
    pub fn element_type(items: &[Value], declared: &DeclaredType) -> DeclaredType {
        match declared.element() {
            Some(element) if *element != DeclaredType::Unknown => element.clone(),
            _ => items
                .first()
                .map(Value::declared_type)
                .unwrap_or(DeclaredType::Unknown),
        }
    }

    fn raw_text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            other => other.to_string(),
        }
    }
}

/// Where rendered literal values go.
pub enum LiteralChannel<'a> {
    /// Straight into the SQL text.
    Inline,
    /// Into named parameters; the text receives placeholders. `NULL`,
    /// non-finite decimals and booleans stay inline.
    Bound(&'a mut ParamContext),
}

impl LiteralChannel<'_> {
    pub fn literal(&mut self, value: &Value, declared: &DeclaredType) -> String {
        match self {
            LiteralChannel::Bound(ctx) if !(value.is_sql_null() || matches!(value, Value::Bool(_))) => {
                ctx.bind(value, declared)
            }
            _ => LiteralFormatter::format(value, declared),
        }
    }

    pub fn equality(&mut self, field: &str, value: &Value, declared: &DeclaredType) -> String {
        if matches!(self, LiteralChannel::Inline) {
            return LiteralFormatter::format_equality(field, value, declared);
        }
        format!("{} = {}", field, self.literal(value, declared))
    }

    pub fn in_list(&mut self, items: &[Value], element: &DeclaredType) -> String {
        match self {
            LiteralChannel::Inline => LiteralFormatter::format_in_list(items, element),
            LiteralChannel::Bound(ctx) => {
                let placeholders: Vec<String> = items.iter().map(|v| ctx.bind(v, element)).collect();
                placeholders.join(", ")
            }
        }
    }
}
