//! Repository seam.
//!
//! Turns entity queries, key lookups, builders and raw statements into
//! [`PreparedQuery`] values for an external [`DataStore`]. Nothing here talks
//! to a database.

use std::marker::PhantomData;

use sha2::{Digest, Sha256};

use crate::ast::builders::{eq, field, lit};
use crate::ast::{Predicate, Value};
use crate::config::Config;
use crate::error::{PredsqlError, PredsqlResult};
use crate::filter::combine;
use crate::parser::parameter_names;
use crate::query::{PreparedQuery, QueryOptions, SelectBuilder, SortOrder};
use crate::transpiler::{Parameter, PredicateCompiler};

/// A record type stored in one table.
pub trait Entity {
    const TABLE: &'static str;
    const KEY: &'static str = "ID";
}

/// Criteria, included columns and ordering for one lookup.
#[derive(Debug, Clone, Default)]
pub struct EntityQuery {
    criteria: Vec<Predicate>,
    includes: Vec<String>,
    order: Option<(String, SortOrder)>,
}

impl EntityQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_criteria(criteria: Predicate) -> Self {
        Self::new().where_(criteria)
    }

    pub fn where_(mut self, criteria: Predicate) -> Self {
        self.criteria.push(criteria);
        self
    }

    pub fn include(mut self, column: impl Into<String>) -> Self {
        self.includes.push(column.into());
        self
    }

    /// Ascending order. Replaces any earlier ordering.
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order = Some((column.into(), SortOrder::Asc));
        self
    }

    /// Descending order. Replaces any earlier ordering.
    pub fn order_by_descending(mut self, column: impl Into<String>) -> Self {
        self.order = Some((column.into(), SortOrder::Desc));
        self
    }

    /// All criteria folded into one conjunction.
    pub fn criteria(&self) -> Option<Predicate> {
        if self.criteria.is_empty() {
            None
        } else {
            Some(combine(self.criteria.iter().cloned()))
        }
    }
}

/// External executor of prepared queries.
pub trait DataStore {
    type Rows;
    type Error: std::fmt::Display;

    fn fetch(&self, query: &PreparedQuery) -> Result<Self::Rows, Self::Error>;
}

/// Prepares statements against the table of `E`.
#[derive(Debug, Clone)]
pub struct SqlRepository<E> {
    compiler: PredicateCompiler,
    options: QueryOptions,
    _entity: PhantomData<E>,
}

impl<E: Entity> SqlRepository<E> {
    pub fn new(config: &Config) -> Self {
        Self {
            compiler: config.compiler(),
            options: config.query.clone(),
            _entity: PhantomData,
        }
    }

    fn select(&self) -> SelectBuilder {
        SelectBuilder::new()
            .with_options(self.options.clone())
            .from(E::TABLE)
    }

    pub fn get_all(&self) -> PreparedQuery {
        self.select().build()
    }

    pub fn get_by_id(&self, id: i64) -> PredsqlResult<PreparedQuery> {
        self.find_with(&EntityQuery::with_criteria(eq(field(E::KEY), lit(id))))
    }

    pub fn find_with(&self, query: &EntityQuery) -> PredsqlResult<PreparedQuery> {
        let mut builder = self.select();
        for column in &query.includes {
            builder = builder.add_column(column.clone());
        }
        if let Some(criteria) = query.criteria() {
            builder = builder.filter_predicate(&self.compiler, &criteria)?;
        }
        if let Some((column, direction)) = &query.order {
            builder = builder.order_by(column.clone(), *direction);
        }
        Ok(builder.build())
    }

    /// Render a hand-composed builder with this repository's query options.
    pub fn prepare(&self, builder: SelectBuilder) -> PreparedQuery {
        builder.with_options(self.options.clone()).build()
    }

    /// Bind positional values to the `@name` placeholders of `sql`, in order of
    /// first appearance.
    pub fn raw(&self, sql: &str, values: Vec<Value>) -> PredsqlResult<PreparedQuery> {
        let names = parameter_names(sql);
        if names.len() != values.len() {
            return Err(PredsqlError::ParameterCount {
                expected: names.len(),
                found: values.len(),
            });
        }
        let params = names
            .iter()
            .zip(values)
            .map(|(name, value)| Parameter::inferred(name, value))
            .collect();
        Ok(PreparedQuery::new(sql).with_params(params))
    }

    /// Cache key `<table>:<operation>:<digest>`, where the digest is the first
    /// 8 bytes of a SHA-256 over the statement text and its parameters. Keys
    /// are stable across processes and builds.
    pub fn cache_key(&self, operation: &str, query: &PreparedQuery) -> String {
        let mut hasher = Sha256::new();
        hasher.update(query.sql.as_bytes());
        for param in &query.params {
            hasher.update(b"\n");
            hasher.update(param.to_string().as_bytes());
        }
        let digest = hasher.finalize();
        let short: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
        format!("{}:{}:{}", E::TABLE, operation, short)
    }

    pub fn fetch<S: DataStore>(&self, store: &S, query: &PreparedQuery) -> PredsqlResult<S::Rows> {
        store.fetch(query).map_err(|e| {
            tracing::warn!("Data store rejected statement on {}: {}", E::TABLE, e);
            PredsqlError::Execution(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use crate::transpiler::{CompileOptions, LiteralMode, SqlType};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    struct User;

    impl Entity for User {
        const TABLE: &'static str = "Users";
    }

    struct Order;

    impl Entity for Order {
        const TABLE: &'static str = "Orders";
        const KEY: &'static str = "OrderId";
    }

    fn users() -> SqlRepository<User> {
        SqlRepository::new(&Config::default())
    }

    #[test]
    fn test_get_all() {
        assert_eq!(users().get_all().sql, "SELECT *\nFROM Users");
    }

    #[test]
    fn test_get_by_id_uses_key_column() {
        let repo: SqlRepository<Order> = SqlRepository::new(&Config::default());
        assert_eq!(
            repo.get_by_id(7).unwrap().sql,
            "SELECT *\nFROM Orders\nWHERE (OrderId = 7)"
        );
    }

    #[test]
    fn test_find_with_entity_query() {
        let query = EntityQuery::with_criteria(eq(field("Active"), lit(true)))
            .where_(contains_any(lit(vec![1, 2]), field("RoleId")))
            .include("Id")
            .include("Name")
            .order_by("Name")
            .order_by_descending("CreatedAt");
        let prepared = users().find_with(&query).unwrap();
        assert_eq!(
            prepared.sql,
            "SELECT Id, Name\nFROM Users\nWHERE ((Active = 1) AND RoleId IN (1,2))\nORDER BY CreatedAt DESC"
        );
    }

    #[test]
    fn test_find_with_bound_literals() {
        let config = Config {
            compiler: CompileOptions {
                literals: LiteralMode::Bound,
                ..CompileOptions::default()
            },
            ..Config::default()
        };
        let repo: SqlRepository<User> = SqlRepository::new(&config);
        let prepared = repo
            .find_with(&EntityQuery::with_criteria(eq(field("Name"), lit("x' OR 1=1 --"))))
            .unwrap();
        assert_eq!(prepared.sql, "SELECT *\nFROM Users\nWHERE (Name = @p0)");
        assert_eq!(prepared.params[0].value, Value::from("x' OR 1=1 --"));
    }

    #[test]
    fn test_compile_errors_propagate() {
        let query = EntityQuery::with_criteria(call("startsWith", Some(field("Name")), vec![lit("A")]));
        assert!(matches!(
            users().find_with(&query),
            Err(PredsqlError::UnsupportedExpression { .. })
        ));
    }

    #[test]
    fn test_raw_binds_in_first_appearance_order() {
        let prepared = users()
            .raw(
                "SELECT * FROM Users WHERE Age > @MinAge AND Name = @Name OR Age > @MinAge",
                vec![Value::from(18), Value::from("Ann")],
            )
            .unwrap();
        assert_eq!(prepared.params[0].name, "@MinAge");
        assert_eq!(prepared.params[0].sql_type, SqlType::BigInt);
        assert_eq!(prepared.params[1].name, "@Name");
    }

    #[test]
    fn test_raw_count_mismatch() {
        let err = users().raw("WHERE A = @a AND B = @b", vec![Value::from(1)]).unwrap_err();
        assert!(matches!(err, PredsqlError::ParameterCount { expected: 2, found: 1 }));
    }

    #[test]
    fn test_cache_key_is_stable() {
        let repo = users();
        let query = EntityQuery::with_criteria(eq(field("Id"), lit(1)));
        let a = repo.find_with(&query).unwrap();
        let b = repo.find_with(&query).unwrap();
        assert_eq!(repo.cache_key("find", &a), repo.cache_key("find", &b));
        assert!(repo.cache_key("find", &a).starts_with("Users:find:"));
        assert_ne!(repo.cache_key("find", &a), repo.cache_key("all", &a));
        assert_ne!(repo.cache_key("find", &a), repo.cache_key("find", &repo.get_all()));
    }

    #[test]
    fn test_cache_key_is_pinned() {
        let repo = users();
        assert_eq!(repo.cache_key("all", &repo.get_all()), "Users:all:5536be476b111c1b");
    }

    #[test]
    fn test_cache_key_covers_parameter_values() {
        let repo = users();
        let a = repo.raw("SELECT * FROM Users WHERE Id = @Id", vec![Value::from(1)]).unwrap();
        let b = repo.raw("SELECT * FROM Users WHERE Id = @Id", vec![Value::from(2)]).unwrap();
        assert_ne!(repo.cache_key("raw", &a), repo.cache_key("raw", &b));
    }

    struct RecordingStore {
        seen: RefCell<Vec<String>>,
        fail: bool,
    }

    impl DataStore for RecordingStore {
        type Rows = usize;
        type Error = String;

        fn fetch(&self, query: &PreparedQuery) -> Result<usize, String> {
            self.seen.borrow_mut().push(query.sql.clone());
            if self.fail {
                Err("Invalid column name 'Nope'".to_string())
            } else {
                Ok(3)
            }
        }
    }

    #[test]
    fn test_fetch_delegates_and_wraps_errors() {
        let repo = users();
        let store = RecordingStore {
            seen: RefCell::new(Vec::new()),
            fail: false,
        };
        assert_eq!(repo.fetch(&store, &repo.get_all()).unwrap(), 3);
        assert_eq!(store.seen.borrow().len(), 1);

        let failing = RecordingStore {
            seen: RefCell::new(Vec::new()),
            fail: true,
        };
        let err = repo.fetch(&failing, &repo.get_all()).unwrap_err();
        assert_eq!(err.to_string(), "Execution error: Invalid column name 'Nope'");
    }

    #[test]
    fn test_prepare_applies_repository_options() {
        let config = Config::from_toml("[query]\nrecompile_hint = false\n").unwrap();
        let repo: SqlRepository<User> = SqlRepository::new(&config);
        let prepared = repo.prepare(SelectBuilder::new().from("Users").offset(0, 5));
        assert_eq!(prepared.sql, "SELECT *\nFROM Users\nOFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY");
    }
}
