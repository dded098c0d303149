//! Fluent constructors for predicate trees.
//!
//! ```
//! use predsql::ast::builders::*;
//!
//! let p = eq(field("Active"), lit(true)).and(contains_any(lit(vec![1, 2]), field("RoleId")));
//! assert_eq!(predsql::compile_predicate(&p).unwrap(), "(Active = 1 AND RoleId IN (1,2))");
//! ```

use crate::ast::{ComparisonOp, DeclaredType, LogicalOp, Method, Predicate, Value};

/// Field reference (`MemberAccess`).
pub fn field(path: impl Into<String>) -> Predicate {
    Predicate::Member { path: path.into() }
}

/// Constant whose declared type is inferred from the value.
pub fn lit(value: impl Into<Value>) -> Predicate {
    Predicate::Constant {
        value: value.into(),
        declared: None,
    }
}

/// Constant with an explicit declared type.
pub fn typed(value: impl Into<Value>, declared: DeclaredType) -> Predicate {
    Predicate::Constant {
        value: value.into(),
        declared: Some(declared),
    }
}

/// List constant with an explicit element type (needed for empty lists).
pub fn list_of<V: Into<Value>>(element: DeclaredType, items: impl IntoIterator<Item = V>) -> Predicate {
    typed(
        Value::List(items.into_iter().map(Into::into).collect()),
        DeclaredType::List(Box::new(element)),
    )
}

/// The `NULL` constant.
pub fn null() -> Predicate {
    lit(Value::Null)
}

fn compare(op: ComparisonOp, left: Predicate, right: Predicate) -> Predicate {
    Predicate::Comparison {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// `left = right` (`IS` when right is `NULL`)
pub fn eq(left: Predicate, right: Predicate) -> Predicate {
    compare(ComparisonOp::Eq, left, right)
}

/// `left <> right` (`IS NOT` when right is `NULL`)
pub fn ne(left: Predicate, right: Predicate) -> Predicate {
    compare(ComparisonOp::Neq, left, right)
}

/// `left < right`
pub fn lt(left: Predicate, right: Predicate) -> Predicate {
    compare(ComparisonOp::Lt, left, right)
}

/// `left <= right`
pub fn lte(left: Predicate, right: Predicate) -> Predicate {
    compare(ComparisonOp::Lte, left, right)
}

/// `left > right`
pub fn gt(left: Predicate, right: Predicate) -> Predicate {
    compare(ComparisonOp::Gt, left, right)
}

/// `left >= right`
pub fn gte(left: Predicate, right: Predicate) -> Predicate {
    compare(ComparisonOp::Gte, left, right)
}

/// `path IS NULL`
pub fn is_null(path: impl Into<String>) -> Predicate {
    eq(field(path), null())
}

/// `path IS NOT NULL`
pub fn is_not_null(path: impl Into<String>) -> Predicate {
    ne(field(path), null())
}

pub fn and(left: Predicate, right: Predicate) -> Predicate {
    logical(LogicalOp::And, left, right)
}

pub fn or(left: Predicate, right: Predicate) -> Predicate {
    logical(LogicalOp::Or, left, right)
}

fn logical(op: LogicalOp, left: Predicate, right: Predicate) -> Predicate {
    Predicate::Logical {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn not(operand: Predicate) -> Predicate {
    operand.negate()
}

/// `CASE WHEN test THEN if_true ELSE if_false END`
pub fn case_when(test: Predicate, if_true: Predicate, if_false: Predicate) -> Predicate {
    Predicate::Conditional {
        test: Box::new(test),
        if_true: Box::new(if_true),
        if_false: Box::new(if_false),
    }
}

/// `receiver.equals(arg)`
pub fn equals(receiver: Predicate, arg: Predicate) -> Predicate {
    Predicate::Call {
        method: Method::Equals.name().to_string(),
        receiver: Some(Box::new(receiver)),
        args: vec![arg],
    }
}

/// `containsAny(collection, value)`: `value IN (collection...)`
pub fn contains_any(collection: Predicate, value: Predicate) -> Predicate {
    Predicate::Call {
        method: Method::ContainsAny.name().to_string(),
        receiver: None,
        args: vec![collection, value],
    }
}

/// Call by name. Names outside the whitelist fail at compile time.
pub fn call(method: impl Into<String>, receiver: Option<Predicate>, args: Vec<Predicate>) -> Predicate {
    Predicate::Call {
        method: method.into(),
        receiver: receiver.map(Box::new),
        args,
    }
}

pub fn convert(operand: Predicate, target: DeclaredType) -> Predicate {
    Predicate::Convert {
        operand: Box::new(operand),
        target,
    }
}
