//! Declarative query descriptions.
//!
//! A TOML document that drives a [`SelectBuilder`] call by call:
//!
//! ```toml
//! select = "Id,Name"
//! from = "Users"
//! row_count = true
//!
//! [[where]]
//! condition = "Active = 1"
//!
//! [[where]]
//! op = "or"
//! condition = "IsAdmin = 1"
//!
//! [[order]]
//! column = "Name"
//! direction = "ASC"
//!
//! [page]
//! offset = 0
//! page_size = 10
//! ```

use serde::Deserialize;

use crate::ast::{Predicate, Value};
use crate::error::{PredsqlError, PredsqlResult};
use crate::query::{Combinator, Cte, JoinKind, Pagination, QueryOptions, SelectBuilder, SortOrder};
use crate::transpiler::{PredicateCompiler, SqlType};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryDefinition {
    pub select: Option<String>,
    pub columns: Vec<String>,
    pub row_count: bool,
    pub from: Option<String>,
    #[serde(rename = "cte")]
    pub ctes: Vec<Cte>,
    #[serde(rename = "join")]
    pub joins: Vec<JoinDefinition>,
    #[serde(rename = "where")]
    pub conditions: Vec<ConditionDefinition>,
    /// Predicate tree compiled and AND-ed after the textual conditions.
    pub predicate: Option<Predicate>,
    pub group_by: Option<String>,
    pub having: Option<String>,
    pub order: Vec<OrderDefinition>,
    pub page: Option<Pagination>,
    #[serde(rename = "parameter")]
    pub parameters: Vec<ParameterDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinDefinition {
    #[serde(default)]
    pub kind: JoinKind,
    pub table: String,
    pub alias: String,
    pub on: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionDefinition {
    #[serde(default, rename = "op")]
    pub combinator: Combinator,
    pub condition: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderDefinition {
    /// Plain column; mutually exclusive with `case`.
    pub column: Option<String>,
    /// `CASE <case> END`, followed by `default`.
    pub case: Option<String>,
    pub default: Option<String>,
    #[serde(default)]
    pub direction: SortOrder,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDefinition {
    pub name: String,
    pub value: toml::Value,
    #[serde(rename = "type")]
    pub sql_type: Option<SqlType>,
}

impl QueryDefinition {
    pub fn from_toml(text: &str) -> PredsqlResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Replay the definition onto a fresh builder.
    pub fn into_builder(
        self,
        compiler: &PredicateCompiler,
        options: QueryOptions,
    ) -> PredsqlResult<SelectBuilder> {
        let mut builder = SelectBuilder::new().with_options(options);

        for cte in self.ctes {
            builder = builder.with_cte(cte.name, cte.query);
        }
        if let Some(select) = &self.select {
            builder = builder.select(select);
        }
        for column in self.columns {
            builder = builder.add_column(column);
        }
        if self.row_count {
            builder = builder.add_row_count();
        }
        if let Some(from) = self.from {
            builder = builder.from(from);
        }
        for join in self.joins {
            builder = builder.join_kind(join.kind, join.table, join.alias, join.on);
        }
        for c in self.conditions {
            builder = match c.combinator {
                Combinator::First => builder.where_(c.condition),
                Combinator::And => builder.and(c.condition),
                Combinator::Or => builder.or(c.condition),
                Combinator::AndNot => builder.not(c.condition),
            };
        }
        if let Some(predicate) = &self.predicate {
            builder = builder.filter_predicate(compiler, predicate)?;
        }
        if let Some(columns) = self.group_by {
            builder = builder.group_by(columns);
        }
        if let Some(condition) = self.having {
            builder = builder.having(condition);
        }
        for item in self.order {
            builder = match (item.column, item.case) {
                (Some(column), None) => builder.order_by(column, item.direction),
                (None, Some(case)) => {
                    let default = item.default.ok_or_else(|| {
                        PredsqlError::Config("order entry with `case` needs a `default`".to_string())
                    })?;
                    builder.order_by_case(case, default, item.direction)
                }
                _ => {
                    return Err(PredsqlError::Config(
                        "order entry needs exactly one of `column` or `case`".to_string(),
                    ));
                }
            };
        }
        if let Some(page) = self.page {
            builder = builder.offset(page.offset, page.page_size);
        }
        for param in self.parameters {
            let value = value_from_toml(&param.value)?;
            builder = match param.sql_type {
                Some(sql_type) => builder.add_parameter(&param.name, value, sql_type),
                None => {
                    let sql_type = SqlType::for_value(&value, &value.declared_type());
                    builder.add_parameter(&param.name, value, sql_type)
                }
            };
        }

        Ok(builder)
    }
}

/// Plain TOML scalars and arrays as parameter values. TOML datetimes must carry
/// a date and a time; strings stay strings.
pub fn value_from_toml(value: &toml::Value) -> PredsqlResult<Value> {
    match value {
        toml::Value::String(s) => Ok(Value::String(s.clone())),
        toml::Value::Integer(n) => Ok(Value::Int(*n)),
        toml::Value::Float(n) => Ok(Value::Decimal(*n)),
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Datetime(dt) => {
            let text = dt.to_string();
            chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S"))
                .map(Value::DateTime)
                .map_err(|e| PredsqlError::Config(format!("bad datetime '{}': {}", text, e)))
        }
        toml::Value::Array(items) => items
            .iter()
            .map(value_from_toml)
            .collect::<PredsqlResult<Vec<_>>>()
            .map(Value::List),
        toml::Value::Table(_) => Err(PredsqlError::Config(
            "parameter values must be scalars or arrays".to_string(),
        )),
    }
}
