//! Placeholder scanner for hand-written SQL, using nom.
//!
//! Finds the `@name` placeholders of a statement so positional values can be
//! bound to them by name, and renames them without touching quoted text.
//!
//! ```text
//! SELECT * FROM Users WHERE Id = @Id AND Name <> '@literal' -- @ignored
//!                                ───┬                 ────┬───    ───┬───
//!                                   │                     │          └── comment, skipped
//!                                   │                     └── quoted text, skipped
//!                                   └── placeholder
//! ```

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, tag, take_till1, take_while, take_while1},
    character::complete::{anychar, char},
    combinator::{map, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Placeholder(&'a str),
    Text(&'a str),
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `@@ROWCOUNT` and friends.
fn parse_system_variable(input: &str) -> IResult<&str, Token<'_>> {
    map(recognize(pair(tag("@@"), take_while(is_word))), Token::Text)(input)
}

fn parse_placeholder(input: &str) -> IResult<&str, Token<'_>> {
    map(preceded(char('@'), take_while1(is_word)), Token::Placeholder)(input)
}

/// `'...'` with `''` escapes.
fn parse_quoted(input: &str) -> IResult<&str, Token<'_>> {
    map(
        recognize(delimited(
            char('\''),
            many0(alt((tag("''"), is_not("'")))),
            char('\''),
        )),
        Token::Text,
    )(input)
}

fn parse_line_comment(input: &str) -> IResult<&str, Token<'_>> {
    map(recognize(pair(tag("--"), opt(is_not("\n")))), Token::Text)(input)
}

fn parse_other(input: &str) -> IResult<&str, Token<'_>> {
    map(
        alt((
            take_till1(|c: char| c == '@' || c == '\'' || c == '-'),
            // Lone '@', '-' or an unterminated quote.
            recognize(anychar),
        )),
        Token::Text,
    )(input)
}

fn parse_token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        parse_system_variable,
        parse_placeholder,
        parse_quoted,
        parse_line_comment,
        parse_other,
    ))(input)
}

/// Every token of `sql`; their texts concatenate back to the input.
fn tokens(sql: &str) -> Vec<Token<'_>> {
    match many0(parse_token)(sql) {
        Ok((rest, mut tokens)) => {
            if !rest.is_empty() {
                tokens.push(Token::Text(rest));
            }
            tokens
        }
        Err(_) => vec![Token::Text(sql)],
    }
}

/// Placeholder names (without `@`) in order of first appearance, deduplicated.
pub fn parameter_names(sql: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in tokens(sql) {
        if let Token::Placeholder(name) = token {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Rewrite placeholders for which `rename` returns a new name (both without
/// `@`). Quoted text, comments and system variables are left alone.
pub fn rename_placeholders<F>(sql: &str, rename: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(sql.len());
    for token in tokens(sql) {
        match token {
            Token::Placeholder(name) => {
                out.push('@');
                match rename(name) {
                    Some(renamed) => out.push_str(&renamed),
                    None => out.push_str(name),
                }
            }
            Token::Text(text) => out.push_str(text),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_placeholders() {
        assert_eq!(
            parameter_names("SELECT * FROM Users WHERE Id = @Id AND Name = @Name"),
            vec!["Id", "Name"]
        );
    }

    #[test]
    fn test_first_appearance_order_and_dedup() {
        assert_eq!(
            parameter_names("WHERE B = @b OR A = @a OR B2 = @b"),
            vec!["b", "a"]
        );
    }

    #[test]
    fn test_system_variables_skipped() {
        assert_eq!(parameter_names("SELECT @@ROWCOUNT, @x"), vec!["x"]);
    }

    #[test]
    fn test_quoted_and_commented_text_skipped() {
        assert_eq!(
            parameter_names("WHERE Email = 'a@b.com' AND Note = 'it''s @x' -- @y\nAND Id = @Id"),
            vec!["Id"]
        );
    }

    #[test]
    fn test_edge_inputs() {
        assert!(parameter_names("").is_empty());
        assert!(parameter_names("SELECT 1 - 2 @ 'open").is_empty());
        assert_eq!(parameter_names("@Ünïcode_1"), vec!["Ünïcode_1"]);
    }

    #[test]
    fn test_rename_whole_placeholders_only() {
        let sql = "WHERE A = @p0 AND B = '@p0' AND C = @p01 -- @p0\nAND D = @p0";
        let renamed = rename_placeholders(sql, |name| (name == "p0").then(|| "p5".to_string()));
        assert_eq!(renamed, "WHERE A = @p5 AND B = '@p0' AND C = @p01 -- @p0\nAND D = @p5");
    }

    #[test]
    fn test_rename_keeps_text_intact() {
        let sql = "SELECT @@ROWCOUNT, 1 - 2 @ 'open";
        assert_eq!(rename_placeholders(sql, |_| Some("x".to_string())), sql);
        assert_eq!(rename_placeholders("", |_| None), "");
    }
}
