use serde::{Deserialize, Serialize};

/// A named common table expression: `name AS (query)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cte {
    pub name: String,
    pub query: String,
}

/// Join kinds accepted by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    LeftOuter,
    RightOuter,
}

impl JoinKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
            JoinKind::RightOuter => "RIGHT OUTER JOIN",
        }
    }
}

/// One entry of the FROM/JOIN section, kept in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceClause {
    From(String),
    Join {
        kind: JoinKind,
        table: String,
        alias: String,
        on: String,
    },
}

impl std::fmt::Display for SourceClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceClause::From(table) => write!(f, "FROM {}", table),
            SourceClause::Join {
                kind,
                table,
                alias,
                on,
            } => write!(f, "{} {} AS {} ON {}", kind.keyword(), table, alias, on),
        }
    }
}

/// How a WHERE entry attaches to the entries before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    /// Added through `where_`. Joins with `AND` when it is not first.
    #[default]
    First,
    And,
    Or,
    AndNot,
}

impl Combinator {
    /// Prefix when the entry opens the WHERE clause.
    pub fn leading(&self) -> Option<&'static str> {
        match self {
            Combinator::AndNot => Some("NOT"),
            _ => None,
        }
    }

    /// Prefix when the entry follows another one.
    pub fn joiner(&self) -> &'static str {
        match self {
            Combinator::First | Combinator::And => "AND",
            Combinator::Or => "OR",
            Combinator::AndNot => "AND NOT",
        }
    }
}

/// A WHERE entry: combinator plus verbatim condition text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub combinator: Combinator,
    pub text: String,
}

impl Condition {
    /// Condition body; negated entries are parenthesized.
    pub fn body(&self) -> String {
        match self.combinator {
            Combinator::AndNot => format!("({})", self.text),
            _ => self.text.clone(),
        }
    }
}

/// GROUP BY / HAVING text, kept verbatim and in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupClause {
    GroupBy(String),
    Having(String),
}

impl std::fmt::Display for GroupClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupClause::GroupBy(columns) => write!(f, "GROUP BY {}", columns),
            GroupClause::Having(condition) => write!(f, "HAVING {}", condition),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

/// ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderItem {
    /// `column dir`
    Column { column: String, direction: SortOrder },
    /// `CASE condition END dir, default dir`
    Case {
        condition: String,
        default: String,
        direction: SortOrder,
    },
}

impl std::fmt::Display for OrderItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderItem::Column { column, direction } => write!(f, "{} {}", column, direction),
            OrderItem::Case {
                condition,
                default,
                direction,
            } => write!(f, "CASE {} END {}, {} {}", condition, direction, default, direction),
        }
    }
}

/// `OFFSET n ROWS FETCH NEXT m ROWS ONLY`. Offset and page size are set together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: u64,
    pub page_size: u64,
}

impl std::fmt::Display for Pagination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
            self.offset, self.page_size
        )
    }
}
