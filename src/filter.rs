//! Predicate combinator.
//!
//! Independent criteria are folded into one conjunction before compilation.
//! The fold starts from an always-true base. The compiler renders an `AND`
//! whose left operand is that base as its right operand alone, at any depth,
//! so combined trees can be combined again.

use crate::ast::Predicate;

/// Fold predicates into `((true AND p1) AND p2) ...`, preserving caller order.
///
/// Zero predicates yield the bare true base, which compiles to an empty
/// fragment ("no constraint").
pub fn combine<I>(predicates: I) -> Predicate
where
    I: IntoIterator<Item = Predicate>,
{
    predicates
        .into_iter()
        .fold(Predicate::always_true(), |acc, p| acc.and(p))
}

/// Fluent accumulator over [`combine`].
///
/// # Example
/// ```
/// use predsql::ast::builders::*;
/// use predsql::filter::FilterBuilder;
///
/// let filter = FilterBuilder::new()
///     .where_(eq(field("Active"), lit(true)))
///     .where_(gt(field("Age"), lit(18)))
///     .build()
///     .unwrap();
/// assert_eq!(predsql::compile_predicate(&filter).unwrap(), "((Active = 1) AND Age > 18)");
/// ```
#[derive(Debug, Clone)]
pub struct FilterBuilder {
    current: Predicate,
    count: usize,
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self {
            current: Predicate::always_true(),
            count: 0,
        }
    }

    /// AND another predicate onto the accumulated filter.
    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.current = self.current.and(predicate);
        self.count += 1;
        self
    }

    /// Add a predicate only when `condition` holds.
    pub fn where_if(self, condition: bool, predicate: Predicate) -> Self {
        if condition { self.where_(predicate) } else { self }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        self.count
    }

    /// The combined tree, or `None` when nothing was added.
    pub fn build(self) -> Option<Predicate> {
        if self.count == 0 { None } else { Some(self.current) }
    }

    /// The combined tree, including the bare true base when empty.
    pub fn into_predicate(self) -> Predicate {
        self.current
    }
}

impl FromIterator<Predicate> for FilterBuilder {
    fn from_iter<T: IntoIterator<Item = Predicate>>(iter: T) -> Self {
        iter.into_iter().fold(FilterBuilder::new(), FilterBuilder::where_)
    }
}
