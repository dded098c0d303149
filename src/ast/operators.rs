use serde::{Deserialize, Serialize};

/// Comparison operator between two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ComparisonOp {
    /// SQL symbol for the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Neq => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
        }
    }

    /// Keyword used instead of the symbol when the right operand is `NULL`.
    pub fn null_keyword(&self) -> Option<&'static str> {
        match self {
            ComparisonOp::Eq => Some("IS"),
            ComparisonOp::Neq => Some("IS NOT"),
            _ => None,
        }
    }
}

/// Logical connective between two predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    #[default]
    And,
    Or,
}

impl LogicalOp {
    pub fn keyword(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

/// Whitelisted method calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `receiver.equals(arg)`
    Equals,
    /// `containsAny(collection, value)`: membership test
    ContainsAny,
}

impl Method {
    /// Resolve a method name from a `Call` node. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "equals" => Some(Method::Equals),
            "containsAny" | "contains_any" => Some(Method::ContainsAny),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Method::Equals => "equals",
            Method::ContainsAny => "containsAny",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_whitelist() {
        assert_eq!(Method::from_name("equals"), Some(Method::Equals));
        assert_eq!(Method::from_name("contains_any"), Some(Method::ContainsAny));
        assert_eq!(Method::from_name("startsWith"), None);
        assert_eq!(Method::from_name("Equals"), None);
    }

    #[test]
    fn test_null_keywords() {
        assert_eq!(ComparisonOp::Eq.null_keyword(), Some("IS"));
        assert_eq!(ComparisonOp::Neq.null_keyword(), Some("IS NOT"));
        assert_eq!(ComparisonOp::Gt.null_keyword(), None);
    }
}
