//! Token assembly for statement text. Every handler in the lifecycle
//! compiler builds an ordered token list and joins it through [`tidy_sql`],
//! so call sites can pass conditionally-empty fragments without worrying
//! about spacing.

use crate::identifier::Fqn;
use crate::resource::ResourceType;

/// One fragment of a statement. Empty fragments vanish during assembly.
#[derive(Debug, Clone)]
pub enum Token {
    Empty,
    Text(String),
    Group(Vec<Token>),
}

impl Token {
    fn collect_into(self, out: &mut Vec<String>) {
        match self {
            Token::Empty => {}
            Token::Text(text) => {
                if !text.trim().is_empty() {
                    out.push(text);
                }
            }
            Token::Group(tokens) => {
                for token in tokens {
                    token.collect_into(out);
                }
            }
        }
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Token::Text(text.to_string())
    }
}

impl From<String> for Token {
    fn from(text: String) -> Self {
        Token::Text(text)
    }
}

impl From<&String> for Token {
    fn from(text: &String) -> Self {
        Token::Text(text.clone())
    }
}

impl<T: Into<Token>> From<Option<T>> for Token {
    fn from(token: Option<T>) -> Self {
        match token {
            Some(token) => token.into(),
            None => Token::Empty,
        }
    }
}

impl From<Vec<Token>> for Token {
    fn from(tokens: Vec<Token>) -> Self {
        Token::Group(tokens)
    }
}

impl From<ResourceType> for Token {
    fn from(resource_type: ResourceType) -> Self {
        Token::Text(resource_type.sql_keyword().to_string())
    }
}

impl From<&Fqn> for Token {
    fn from(fqn: &Fqn) -> Self {
        Token::Text(fqn.to_string())
    }
}

/// Joins tokens into one statement: flattens groups, drops empty tokens,
/// joins with single spaces and collapses any internal whitespace run to one
/// space. The result never has leading or trailing whitespace.
pub fn tidy_sql<I>(tokens: I) -> String
where
    I: IntoIterator,
    I::Item: Into<Token>,
{
    let mut parts = Vec::new();
    for token in tokens {
        token.into().collect_into(&mut parts);
    }
    let joined = parts.join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Assembles a statement from a comma-separated token list. Each element is
/// converted through [`Token::from`], so `Option<&str>` and friends work
/// directly: `stmt!["CREATE", secure.then_some("SECURE"), "VIEW"]`.
#[macro_export]
macro_rules! stmt {
    ($($token:expr),+ $(,)?) => {
        $crate::sql::tidy_sql([$($crate::sql::Token::from($token)),+])
    };
}
