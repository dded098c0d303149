//! Fluent SELECT builder.
//!
//! Every method takes the builder by value and hands it back, so a statement
//! is composed as one chain. Methods never fail: a nonsensical call sequence
//! renders nonsensical SQL, and the data store reports it at execution time.
//!
//! ```
//! use predsql::query::{SelectBuilder, SortOrder};
//! use predsql::transpiler::ToSql;
//!
//! let sql = SelectBuilder::new()
//!     .select("Id,Name")
//!     .from("Users")
//!     .where_("Active = 1")
//!     .order_by("Name", SortOrder::Asc)
//!     .offset(0, 10)
//!     .to_sql();
//! assert_eq!(
//!     sql,
//!     "SELECT Id, Name\nFROM Users\nWHERE Active = 1\nORDER BY Name ASC\nOFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY OPTION (RECOMPILE)"
//! );
//! ```

pub mod clauses;
pub mod definition;
mod render;

pub use self::clauses::{
    Combinator, Condition, Cte, GroupClause, JoinKind, OrderItem, Pagination, SortOrder, SourceClause,
};
pub use self::definition::QueryDefinition;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ast::{Predicate, Value};
use crate::error::PredsqlResult;
use crate::parser::rename_placeholders;
use crate::transpiler::{CompiledFilter, ParamContext, Parameter, PredicateCompiler, SqlType};

/// Rendering settings; the `[query]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Append `OPTION (RECOMPILE)` to the pagination line.
    pub recompile_hint: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { recompile_hint: true }
    }
}

/// Rendered SQL text plus the parameters its placeholders refer to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreparedQuery {
    pub sql: String,
    pub params: Vec<Parameter>,
}

impl PreparedQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<Parameter>) -> Self {
        self.params = params;
        self
    }

    /// Look up a parameter by name, with or without the leading `@`.
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        let name = crate::transpiler::params::placeholder(name);
        self.params.iter().find(|p| p.name == name)
    }
}

impl std::fmt::Display for PreparedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql)
    }
}

/// Accumulated state of one SELECT statement.
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    pub(crate) columns: Vec<String>,
    pub(crate) include_row_count: bool,
    pub(crate) ctes: Vec<Cte>,
    pub(crate) sources: Vec<SourceClause>,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) grouping: Vec<GroupClause>,
    pub(crate) order: Vec<OrderItem>,
    pub(crate) pagination: Option<Pagination>,
    pub(crate) params: Vec<Parameter>,
    pub(crate) options: QueryOptions,
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Replace the column list with a comma-separated list. Blank or `*` keeps it as is.
    pub fn select(mut self, columns: &str) -> Self {
        let columns = columns.trim();
        if columns.is_empty() || columns == "*" {
            return self;
        }
        self.columns = columns
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    /// Append one column unless it is already selected.
    pub fn add_column(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
        self
    }

    /// Add a `COUNT(*) OVER() AS TotalRowCount` window column.
    pub fn add_row_count(mut self) -> Self {
        self.include_row_count = true;
        self
    }

    // =========================================================================
    // Sources
    // =========================================================================

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.sources.push(SourceClause::From(table.into()));
        self
    }

    /// `<KIND> JOIN table AS alias ON condition`
    pub fn join_kind(
        mut self,
        kind: JoinKind,
        table: impl Into<String>,
        alias: impl Into<String>,
        on: impl Into<String>,
    ) -> Self {
        self.sources.push(SourceClause::Join {
            kind,
            table: table.into(),
            alias: alias.into(),
            on: on.into(),
        });
        self
    }

    /// Inner join shorthand.
    pub fn join(self, table: impl Into<String>, alias: impl Into<String>, on: impl Into<String>) -> Self {
        self.join_kind(JoinKind::Inner, table, alias, on)
    }

    pub fn left_join(self, table: impl Into<String>, alias: impl Into<String>, on: impl Into<String>) -> Self {
        self.join_kind(JoinKind::Left, table, alias, on)
    }

    pub fn right_join(self, table: impl Into<String>, alias: impl Into<String>, on: impl Into<String>) -> Self {
        self.join_kind(JoinKind::Right, table, alias, on)
    }

    pub fn left_outer_join(
        self,
        table: impl Into<String>,
        alias: impl Into<String>,
        on: impl Into<String>,
    ) -> Self {
        self.join_kind(JoinKind::LeftOuter, table, alias, on)
    }

    pub fn right_outer_join(
        self,
        table: impl Into<String>,
        alias: impl Into<String>,
        on: impl Into<String>,
    ) -> Self {
        self.join_kind(JoinKind::RightOuter, table, alias, on)
    }

    // =========================================================================
    // Filters
    // =========================================================================

    fn push_condition(mut self, combinator: Combinator, text: impl Into<String>) -> Self {
        let text = text.into();
        // An empty compiled fragment means "no constraint".
        if text.trim().is_empty() {
            return self;
        }
        self.conditions.push(Condition { combinator, text });
        self
    }

    /// Add a condition. Later `where_` calls are AND-joined.
    pub fn where_(self, condition: impl Into<String>) -> Self {
        self.push_condition(Combinator::First, condition)
    }

    pub fn and(self, condition: impl Into<String>) -> Self {
        self.push_condition(Combinator::And, condition)
    }

    pub fn or(self, condition: impl Into<String>) -> Self {
        self.push_condition(Combinator::Or, condition)
    }

    /// `AND NOT (condition)`
    pub fn not(self, condition: impl Into<String>) -> Self {
        self.push_condition(Combinator::AndNot, condition)
    }

    /// `column IN (values)`, values verbatim.
    pub fn is_in(self, column: &str, values: &str) -> Self {
        self.and(format!("{} IN ({})", column, values))
    }

    /// `column NOT IN (values)`, values verbatim.
    pub fn not_in(self, column: &str, values: &str) -> Self {
        self.and(format!("{} NOT IN ({})", column, values))
    }

    pub fn between(self, column: &str, min: &str, max: &str) -> Self {
        self.and(format!("{} BETWEEN {} AND {}", column, min, max))
    }

    pub fn eq(self, column: &str, value: &str) -> Self {
        self.and(format!("{} = {}", column, value))
    }

    pub fn ne(self, column: &str, value: &str) -> Self {
        self.and(format!("{} <> {}", column, value))
    }

    pub fn lt(self, column: &str, value: &str) -> Self {
        self.and(format!("{} < {}", column, value))
    }

    pub fn lte(self, column: &str, value: &str) -> Self {
        self.and(format!("{} <= {}", column, value))
    }

    pub fn gt(self, column: &str, value: &str) -> Self {
        self.and(format!("{} > {}", column, value))
    }

    pub fn gte(self, column: &str, value: &str) -> Self {
        self.and(format!("{} >= {}", column, value))
    }

    pub fn is_null(self, column: &str) -> Self {
        self.and(format!("{} IS NULL", column))
    }

    pub fn is_not_null(self, column: &str) -> Self {
        self.and(format!("{} IS NOT NULL", column))
    }

    /// Append `condition @name` and bind `name` with an inferred type.
    ///
    /// Skipped when either the condition or the name is blank.
    pub fn add_filter(self, condition: &str, name: &str, value: impl Into<Value>) -> Self {
        if condition.trim().is_empty() || name.trim().is_empty() {
            return self;
        }
        let param = Parameter::inferred(name, value);
        let text = format!("{} {}", condition.trim(), param.name);
        self.and(text).push_param(param)
    }

    /// AND a compiled filter and take over its bound parameters.
    ///
    /// Every bound compilation numbers its parameters from `@p0`, so incoming
    /// names already bound on this builder are renumbered, in the text and in
    /// the parameters, to the next free index of the same stem.
    pub fn filter(self, compiled: CompiledFilter) -> Self {
        let CompiledFilter { sql, params } = compiled;
        let mut bound: HashSet<String> = self.params.iter().map(|p| p.name.clone()).collect();
        let mut taken = bound.clone();
        taken.extend(params.iter().map(|p| p.name.clone()));

        let mut renames: HashMap<String, String> = HashMap::new();
        let mut incoming = Vec::with_capacity(params.len());
        for mut param in params {
            if bound.contains(&param.name) {
                let fresh = next_free_name(&param.name, &taken);
                tracing::debug!("Renumbering filter parameter {} to {}", param.name, fresh);
                taken.insert(fresh.clone());
                renames.insert(param.name.trim_start_matches('@').to_string(), fresh.clone());
                param.name = fresh;
            }
            bound.insert(param.name.clone());
            incoming.push(param);
        }

        let sql = if renames.is_empty() {
            sql
        } else {
            rename_placeholders(&sql, |name| {
                renames.get(name).map(|fresh| fresh.trim_start_matches('@').to_string())
            })
        };
        incoming
            .into_iter()
            .fold(self.and(sql), SelectBuilder::push_param)
    }

    /// Compile `predicate` and AND the result, see [`filter`](Self::filter).
    pub fn filter_predicate(self, compiler: &PredicateCompiler, predicate: &Predicate) -> PredsqlResult<Self> {
        Ok(self.filter(compiler.compile(predicate)?))
    }

    // =========================================================================
    // Grouping and ordering
    // =========================================================================

    pub fn group_by(mut self, columns: impl Into<String>) -> Self {
        self.grouping.push(GroupClause::GroupBy(columns.into()));
        self
    }

    pub fn having(mut self, condition: impl Into<String>) -> Self {
        self.grouping.push(GroupClause::Having(condition.into()));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: SortOrder) -> Self {
        self.order.push(OrderItem::Column {
            column: column.into(),
            direction,
        });
        self
    }

    /// `CASE condition END dir, default dir`
    pub fn order_by_case(
        mut self,
        condition: impl Into<String>,
        default: impl Into<String>,
        direction: SortOrder,
    ) -> Self {
        self.order.push(OrderItem::Case {
            condition: condition.into(),
            default: default.into(),
            direction,
        });
        self
    }

    /// Skip `offset` rows and take `page_size`.
    pub fn offset(mut self, offset: u64, page_size: u64) -> Self {
        self.pagination = Some(Pagination { offset, page_size });
        self
    }

    // =========================================================================
    // CTEs and parameters
    // =========================================================================

    pub fn with_cte(mut self, name: impl Into<String>, query: impl Into<String>) -> Self {
        self.ctes.push(Cte {
            name: name.into(),
            query: query.into(),
        });
        self
    }

    /// Append a named, typed binding. Duplicate names are not rejected.
    pub fn add_parameter(self, name: &str, value: impl Into<Value>, sql_type: SqlType) -> Self {
        self.push_param(Parameter::new(name, value, sql_type))
    }

    /// Take over the parameters collected by a bound-mode compilation.
    pub fn bind_context(self, ctx: ParamContext) -> Self {
        ctx.into_params()
            .into_iter()
            .fold(self, SelectBuilder::push_param)
    }

    fn push_param(mut self, param: Parameter) -> Self {
        if self.params.iter().any(|p| p.name == param.name) {
            tracing::warn!("Parameter {} bound twice; the data store may reject it", param.name);
        }
        self.params.push(param);
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Rendered SQL text.
    pub fn build_query(&self) -> String {
        self.render()
    }

    /// Rendered SQL text plus a copy of the parameters.
    pub fn build(&self) -> PreparedQuery {
        PreparedQuery {
            sql: self.render(),
            params: self.params.clone(),
        }
    }
}

/// `@p0` with `@p0`, `@p1` taken gives `@p2`.
fn next_free_name(name: &str, taken: &HashSet<String>) -> String {
    let stem = name
        .trim_start_matches('@')
        .trim_end_matches(|c: char| c.is_ascii_digit());
    let mut index = 0usize;
    loop {
        let candidate = format!("@{}{}", stem, index);
        if !taken.contains(&candidate) {
            return candidate;
        }
        index += 1;
    }
}
