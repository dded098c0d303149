//! SQL transpiler.
//!
//! Turns predicate trees into SQL boolean expressions and query-builder state
//! into complete statements.

pub mod literal;
pub mod params;
pub mod predicate;

#[cfg(test)]
mod tests;

pub use self::literal::{LiteralChannel, LiteralFormatter};
pub use self::params::{ParamContext, Parameter, SqlType};
pub use self::predicate::{
    CompileOptions, CompiledFilter, ConvertPolicy, LiteralMode, PredicateCompiler,
};

use crate::ast::Predicate;
use crate::error::PredsqlResult;

/// Trait for rendering infallible SQL fragments.
pub trait ToSql {
    /// Convert this node to a SQL string.
    fn to_sql(&self) -> String;
}

/// Trait for compiling a predicate into a filter fragment.
pub trait ToSqlFilter {
    /// Compile with inline literals.
    fn to_sql_filter(&self) -> PredsqlResult<String>;

    /// Compile with the given compiler's options (and its literal mode).
    fn to_sql_filter_with(&self, compiler: &PredicateCompiler) -> PredsqlResult<CompiledFilter>;
}

impl ToSqlFilter for Predicate {
    fn to_sql_filter(&self) -> PredsqlResult<String> {
        PredicateCompiler::default().compile_inline(self)
    }

    fn to_sql_filter_with(&self, compiler: &PredicateCompiler) -> PredsqlResult<CompiledFilter> {
        compiler.compile(self)
    }
}

/// Compile a predicate tree into a SQL filter fragment with default options.
///
/// An empty result means "no constraint" (an empty membership list, or a
/// combination of zero predicates), never "always false".
pub fn compile_predicate(predicate: &Predicate) -> PredsqlResult<String> {
    predicate.to_sql_filter()
}
