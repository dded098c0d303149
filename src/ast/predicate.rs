use serde::{Deserialize, Serialize};

use crate::ast::{ComparisonOp, DeclaredType, LogicalOp, Value};

/// A node of a predicate tree: a boolean condition over a record's fields.
///
/// Trees are built once by the caller and never mutated afterwards. Children
/// are owned boxes, so a node can never point back at one of its ancestors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Predicate {
    /// `left <op> right`
    Comparison {
        op: ComparisonOp,
        left: Box<Predicate>,
        right: Box<Predicate>,
    },
    /// `(left AND|OR right)`
    Logical {
        op: LogicalOp,
        left: Box<Predicate>,
        right: Box<Predicate>,
    },
    /// `(NOT operand)`
    Not { operand: Box<Predicate> },
    /// Dotted field reference, rendered verbatim.
    Member { path: String },
    /// Typed literal. `declared` falls back to the type of `value`.
    Constant {
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        declared: Option<DeclaredType>,
    },
    /// `(CASE WHEN test THEN if_true ELSE if_false END)`
    Conditional {
        test: Box<Predicate>,
        if_true: Box<Predicate>,
        if_false: Box<Predicate>,
    },
    /// Method call, restricted to the whitelist in [`crate::ast::Method`].
    Call {
        method: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver: Option<Box<Predicate>>,
        #[serde(default)]
        args: Vec<Predicate>,
    },
    /// Type-cast marker.
    Convert {
        operand: Box<Predicate>,
        target: DeclaredType,
    },
    /// Reference to the record itself (a lambda parameter). Never rendered.
    Parameter { name: String },
}

/// The kind of a predicate node, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Comparison,
    Logical,
    Not,
    MemberAccess,
    Constant,
    Conditional,
    Call,
    Convert,
    Parameter,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Comparison => "Comparison",
            NodeKind::Logical => "Logical",
            NodeKind::Not => "Not",
            NodeKind::MemberAccess => "MemberAccess",
            NodeKind::Constant => "Constant",
            NodeKind::Conditional => "Conditional",
            NodeKind::Call => "Call",
            NodeKind::Convert => "Convert",
            NodeKind::Parameter => "Parameter",
        };
        write!(f, "{}", name)
    }
}

impl Predicate {
    pub fn kind(&self) -> NodeKind {
        match self {
            Predicate::Comparison { .. } => NodeKind::Comparison,
            Predicate::Logical { .. } => NodeKind::Logical,
            Predicate::Not { .. } => NodeKind::Not,
            Predicate::Member { .. } => NodeKind::MemberAccess,
            Predicate::Constant { .. } => NodeKind::Constant,
            Predicate::Conditional { .. } => NodeKind::Conditional,
            Predicate::Call { .. } => NodeKind::Call,
            Predicate::Convert { .. } => NodeKind::Convert,
            Predicate::Parameter { .. } => NodeKind::Parameter,
        }
    }

    /// The "always true" base the combinator folds predicates into.
    pub fn always_true() -> Self {
        Predicate::Constant {
            value: Value::Bool(true),
            declared: Some(DeclaredType::Boolean),
        }
    }

    pub fn is_always_true(&self) -> bool {
        matches!(
            self,
            Predicate::Constant {
                value: Value::Bool(true),
                ..
            }
        )
    }

    /// True for a `NULL` constant.
    pub fn is_null_literal(&self) -> bool {
        matches!(self, Predicate::Constant { value, .. } if value.is_null())
    }

    /// `(self AND other)`
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::Logical {
            op: LogicalOp::And,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// `(self OR other)`
    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Logical {
            op: LogicalOp::Or,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// `(NOT self)`
    pub fn negate(self) -> Predicate {
        Predicate::Not {
            operand: Box::new(self),
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Predicate::Comparison { left, right, .. } | Predicate::Logical { left, right, .. } => {
                left.node_count() + right.node_count()
            }
            Predicate::Not { operand } | Predicate::Convert { operand, .. } => operand.node_count(),
            Predicate::Conditional {
                test,
                if_true,
                if_false,
            } => test.node_count() + if_true.node_count() + if_false.node_count(),
            Predicate::Call { receiver, args, .. } => {
                receiver.as_ref().map_or(0, |r| r.node_count())
                    + args.iter().map(Predicate::node_count).sum::<usize>()
            }
            Predicate::Member { .. } | Predicate::Constant { .. } | Predicate::Parameter { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(field("Name").kind().to_string(), "MemberAccess");
        assert_eq!(lit(1).kind(), NodeKind::Constant);
        assert_eq!(eq(field("A"), lit(1)).kind(), NodeKind::Comparison);
    }

    #[test]
    fn test_always_true() {
        assert!(Predicate::always_true().is_always_true());
        assert!(!lit(false).is_always_true());
        assert!(null().is_null_literal());
    }

    #[test]
    fn test_node_count() {
        let p = eq(field("A"), lit(1)).and(not(field("B")));
        assert_eq!(p.node_count(), 6);
    }

    #[test]
    fn test_json_shape() {
        let p = eq(field("Status"), null());
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["node"], "comparison");
        assert_eq!(json["op"], "eq");
        assert_eq!(json["left"]["path"], "Status");
        assert_eq!(json["right"]["value"], "null");

        let back: Predicate = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_json_call_defaults() {
        let json = r#"{"node": "call", "method": "equals", "receiver": {"node": "member", "path": "Name"},
                       "args": [{"node": "constant", "value": {"string": "Ann"}}]}"#;
        let p: Predicate = serde_json::from_str(json).unwrap();
        assert_eq!(p, equals(field("Name"), lit("Ann")));
    }
}
