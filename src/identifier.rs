use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resource::ResourceType;

/// True when the identifier can appear unquoted: letters, digits, `_` and `$`,
/// not starting with a digit or `$`. Snowflake folds these to uppercase, so
/// they are case-insensitive.
fn is_safe_unquoted(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Quotes one identifier part per Snowflake rules. Safe identifiers pass
/// through verbatim; anything else is double-quoted with embedded quotes
/// doubled. An already-quoted identifier is kept as the caller wrote it.
pub fn quote_identifier(ident: &str) -> String {
    if ident.len() >= 2 && ident.starts_with('"') && ident.ends_with('"') {
        return ident.to_string();
    }
    if is_safe_unquoted(ident) {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

/// Splits a trailing argument-type signature off a routine name. Functions
/// and procedures are addressed as `name(VARCHAR, NUMBER)`; the signature is
/// not part of the identifier and must stay outside any quoting.
fn split_signature(name: &str) -> (&str, &str) {
    if let Some(open) = name.find('(') {
        if open > 0 && name.ends_with(')') {
            return (&name[..open], &name[open..]);
        }
    }
    (name, "")
}

/// Fully-qualified object name. `database` and `schema` are optional because
/// Snowflake allows schema-relative and account-level references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fqn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

impl Fqn {
    pub fn new(name: impl Into<String>) -> Self {
        Fqn {
            database: None,
            schema: None,
            name: name.into(),
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(database) = &self.database {
            write!(f, "{}.", quote_identifier(database))?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{}.", quote_identifier(schema))?;
        }
        let (name, signature) = split_signature(&self.name);
        write!(f, "{}{}", quote_identifier(name), signature)
    }
}

/// Resource-type-qualified reference to one warehouse object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Urn {
    pub resource_type: ResourceType,
    pub fqn: Fqn,
    pub account_locator: String,
}

impl Urn {
    pub fn new(resource_type: ResourceType, fqn: Fqn, account_locator: impl Into<String>) -> Self {
        Urn {
            resource_type,
            fqn,
            account_locator: account_locator.into(),
        }
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "urn::{}:{}/{}",
            self.account_locator,
            self.resource_type.label(),
            self.fqn
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_identifiers_pass_through() {
        assert_eq!(quote_identifier("ANALYTICS"), "ANALYTICS");
        assert_eq!(quote_identifier("my_table$1"), "my_table$1");
        assert_eq!(quote_identifier("_staging"), "_staging");
    }

    #[test]
    fn unsafe_identifiers_are_quoted_and_escaped() {
        assert_eq!(quote_identifier("my table"), "\"my table\"");
        assert_eq!(quote_identifier("1st"), "\"1st\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn prequoted_identifiers_are_untouched() {
        assert_eq!(quote_identifier("\"Mixed Case\""), "\"Mixed Case\"");
    }

    #[test]
    fn fqn_omits_absent_parts() {
        assert_eq!(Fqn::new("V1").to_string(), "V1");
        assert_eq!(Fqn::new("V1").with_schema("S1").to_string(), "S1.V1");
        assert_eq!(
            Fqn::new("V1").with_database("D1").with_schema("S1").to_string(),
            "D1.S1.V1"
        );
    }

    #[test]
    fn fqn_rendering_is_idempotent_for_quoted_parts() {
        let fqn = Fqn::new("my view").with_database("D1");
        let once = fqn.to_string();
        assert_eq!(once, "D1.\"my view\"");
        assert_eq!(quote_identifier("\"my view\""), "\"my view\"");
    }

    #[test]
    fn routine_signatures_stay_outside_quoting() {
        assert_eq!(Fqn::new("P1(VARCHAR)").to_string(), "P1(VARCHAR)");
        assert_eq!(
            Fqn::new("AREA(FLOAT, FLOAT)").with_database("D1").with_schema("S1").to_string(),
            "D1.S1.AREA(FLOAT, FLOAT)"
        );
        assert_eq!(Fqn::new("my proc(VARCHAR)").to_string(), "\"my proc\"(VARCHAR)");
        // a lone parenthesized name is not a signature
        assert_eq!(Fqn::new("(odd)").to_string(), "\"(odd)\"");
    }

    #[test]
    fn urn_display_uses_label() {
        let urn = Urn::new(ResourceType::View, Fqn::new("V1").with_database("D1"), "AB12345");
        assert_eq!(urn.to_string(), "urn::AB12345:view/D1.V1");
    }
}
