//! Named, typed parameters.

use serde::{Deserialize, Serialize};

use crate::ast::{DeclaredType, Value};

/// T-SQL parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Decimal,
    Float,
    Money,
    Char,
    VarChar,
    NChar,
    NVarChar,
    Text,
    Date,
    DateTime,
    DateTime2,
    Time,
    UniqueIdentifier,
    VarBinary,
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SqlType::Bit => "BIT",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Int => "INT",
            SqlType::BigInt => "BIGINT",
            SqlType::Decimal => "DECIMAL",
            SqlType::Float => "FLOAT",
            SqlType::Money => "MONEY",
            SqlType::Char => "CHAR",
            SqlType::VarChar => "VARCHAR",
            SqlType::NChar => "NCHAR",
            SqlType::NVarChar => "NVARCHAR",
            SqlType::Text => "TEXT",
            SqlType::Date => "DATE",
            SqlType::DateTime => "DATETIME",
            SqlType::DateTime2 => "DATETIME2",
            SqlType::Time => "TIME",
            SqlType::UniqueIdentifier => "UNIQUEIDENTIFIER",
            SqlType::VarBinary => "VARBINARY",
        };
        write!(f, "{}", name)
    }
}

impl SqlType {
    /// Pick the parameter type for a value, honouring the caller's declared type.
    pub fn for_value(value: &Value, declared: &DeclaredType) -> SqlType {
        match declared {
            DeclaredType::Boolean => return SqlType::Bit,
            DeclaredType::String => return SqlType::NVarChar,
            DeclaredType::Integer => return SqlType::BigInt,
            DeclaredType::Decimal => return SqlType::Decimal,
            DeclaredType::DateTime => return SqlType::DateTime2,
            _ => {}
        }
        match value {
            Value::Bool(_) => SqlType::Bit,
            Value::Int(_) => SqlType::BigInt,
            Value::Decimal(_) => SqlType::Decimal,
            Value::DateTime(_) => SqlType::DateTime2,
            Value::Null | Value::String(_) | Value::List(_) => SqlType::NVarChar,
        }
    }
}

/// A named, typed binding handed to the data store with the SQL text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Placeholder name, always with a single leading `@`.
    pub name: String,
    pub value: Value,
    pub sql_type: SqlType,
}

impl Parameter {
    pub fn new(name: impl AsRef<str>, value: impl Into<Value>, sql_type: SqlType) -> Self {
        Self {
            name: placeholder(name.as_ref()),
            value: value.into(),
            sql_type,
        }
    }

    /// Parameter whose type is inferred from its value.
    pub fn inferred(name: impl AsRef<str>, value: impl Into<Value>) -> Self {
        let value = value.into();
        let sql_type = SqlType::for_value(&value, &value.declared_type());
        Self::new(name, value, sql_type)
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} = {}", self.name, self.sql_type, self.value)
    }
}

/// Normalize a parameter name to `@name`.
pub fn placeholder(name: &str) -> String {
    format!("@{}", name.trim_start_matches('@'))
}

/// Collects literals routed out of the SQL text during a bound compilation.
#[derive(Debug, Clone)]
pub struct ParamContext {
    prefix: String,
    index: usize,
    params: Vec<Parameter>,
}

impl Default for ParamContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamContext {
    pub fn new() -> Self {
        Self::with_prefix("p")
    }

    /// Context whose placeholders read `@<prefix>0`, `@<prefix>1`, ...
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            index: 0,
            params: Vec::new(),
        }
    }

    /// Add a value and return the placeholder for it.
    pub fn bind(&mut self, value: &Value, declared: &DeclaredType) -> String {
        let name = format!("@{}{}", self.prefix, self.index);
        self.index += 1;
        let param = Parameter {
            name: name.clone(),
            value: value.clone(),
            sql_type: SqlType::for_value(value, declared),
        };
        tracing::trace!("Bound {}", param);
        self.params.push(param);
        name
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn into_params(self) -> Vec<Parameter> {
        self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
