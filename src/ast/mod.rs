//! Predicate tree types.

pub mod builders;
pub mod operators;
pub mod predicate;
pub mod values;

pub use self::operators::*;
pub use self::predicate::*;
pub use self::values::*;
