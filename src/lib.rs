//! # predsql
//!
//! Predicate trees to T-SQL filter fragments, and a fluent builder for
//! parameterized SELECT statements.
//!
//! ## Quick Example
//!
//! ```
//! use predsql::prelude::*;
//!
//! let criteria = combine([
//!     eq(field("Active"), lit(true)),
//!     contains_any(lit(vec!["admin", "owner"]), field("Role")),
//! ]);
//! let filter = compile_predicate(&criteria).unwrap();
//! assert_eq!(filter, "((Active = 1) AND Role IN ('admin',' owner'))");
//!
//! let sql = SelectBuilder::new()
//!     .select("Id,Name")
//!     .from("Users")
//!     .where_(filter)
//!     .order_by("Name", SortOrder::Asc)
//!     .offset(0, 10)
//!     .build_query();
//! assert!(sql.ends_with("OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY OPTION (RECOMPILE)"));
//! ```
//!
//! ## Pipeline
//!
//! | Stage       | Module       | Output                    |
//! |-------------|--------------|---------------------------|
//! | Build       | `ast`        | `Predicate` tree          |
//! | Combine     | `filter`     | one conjunction           |
//! | Compile     | `transpiler` | filter text (+ params)    |
//! | Assemble    | `query`      | SELECT text + params      |
//! | Hand off    | `repository` | `PreparedQuery` for a store |

pub mod ast;
pub mod config;
pub mod error;
pub mod filter;
pub mod parser;
pub mod query;
pub mod repository;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::{DeclaredType, Predicate, Value};
    pub use crate::config::Config;
    pub use crate::error::*;
    pub use crate::filter::{FilterBuilder, combine};
    pub use crate::query::{PreparedQuery, SelectBuilder, SortOrder};
    pub use crate::repository::{DataStore, Entity, EntityQuery, SqlRepository};
    pub use crate::transpiler::{
        CompileOptions, LiteralMode, PredicateCompiler, SqlType, ToSql, ToSqlFilter, compile_predicate,
    };
}

pub use transpiler::compile_predicate;
