//! Property schemas map attribute names to the SQL clause fragments they
//! render as. A schema is declared once per resource type and shared
//! read-only across calls; rendering walks attributes in declaration order
//! so clause order stays stable regardless of how the caller built the map.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::CompileError;
use crate::identifier::quote_identifier;

/// Attribute name to desired value, as supplied by the caller.
pub type Attributes = IndexMap<String, Value>;

/// Escapes and single-quotes a string literal.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Renders a scalar value as it appears on the right of `=`: strings quoted,
/// booleans as keywords, numbers verbatim.
pub fn sql_value(value: &Value) -> String {
    match value {
        Value::String(text) => quote_literal(text),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

/// Joins a tag mapping into `key='value', key='value'` text.
pub(crate) fn render_tag_pairs(tags: &serde_json::Map<String, Value>) -> Result<String, CompileError> {
    let mut pairs = Vec::with_capacity(tags.len());
    for (key, value) in tags {
        let Value::String(value) = value else {
            return Err(CompileError::bad_shape(format!("tag `{key}` must have a string value")));
        };
        pairs.push(format!("{}={}", quote_identifier(key), quote_literal(value)));
    }
    Ok(pairs.join(", "))
}

/// How one attribute renders into clause text.
#[derive(Debug, Clone)]
pub enum Prop {
    /// Bare keyword emitted when the value is true: `SECURE`.
    Flag(&'static str),
    /// `KEYWORD = TRUE|FALSE`.
    Bool(&'static str),
    /// `KEYWORD = '<literal>'` with embedded quotes escaped.
    String(&'static str),
    /// `KEYWORD = <integer>`.
    Int(&'static str),
    /// `KEYWORD = <identifier>`, unquoted object reference.
    Identifier(&'static str),
    /// `TAG (key='value', ...)`.
    Tags,
    /// `KEYWORD <raw body>`. The body is caller-trusted SQL and is emitted
    /// unmodified.
    Query(&'static str),
}

impl Prop {
    /// Renders this attribute's clause, or `None` when the value means the
    /// clause should be omitted (null everywhere, false for flags).
    fn render(&self, attr: &str, value: &Value) -> Result<Option<String>, CompileError> {
        if value.is_null() {
            return Ok(None);
        }
        match self {
            Prop::Flag(keyword) => match value {
                Value::Bool(true) => Ok(Some((*keyword).to_string())),
                Value::Bool(false) => Ok(None),
                other => Err(type_error(attr, "a boolean", other)),
            },
            Prop::Bool(keyword) => match value {
                Value::Bool(flag) => Ok(Some(format!("{} = {}", keyword, if *flag { "TRUE" } else { "FALSE" }))),
                other => Err(type_error(attr, "a boolean", other)),
            },
            Prop::String(keyword) => match value {
                Value::String(text) => Ok(Some(format!("{} = {}", keyword, quote_literal(text)))),
                other => Err(type_error(attr, "a string", other)),
            },
            Prop::Int(keyword) => match value {
                Value::Number(number) => Ok(Some(format!("{keyword} = {number}"))),
                other => Err(type_error(attr, "an integer", other)),
            },
            Prop::Identifier(keyword) => match value {
                Value::String(name) => Ok(Some(format!("{} = {}", keyword, quote_identifier(name)))),
                other => Err(type_error(attr, "an identifier string", other)),
            },
            Prop::Tags => match value {
                Value::Object(tags) if tags.is_empty() => Ok(None),
                Value::Object(tags) => Ok(Some(format!("TAG ({})", render_tag_pairs(tags)?))),
                other => Err(type_error(attr, "a mapping of tag names to values", other)),
            },
            Prop::Query(keyword) => match value {
                Value::String(body) => Ok(Some(format!("{keyword} {body}"))),
                other => Err(type_error(attr, "a SQL body string", other)),
            },
        }
    }
}

fn type_error(attr: &str, expected: &str, got: &Value) -> CompileError {
    CompileError::bad_shape(format!("attribute `{attr}` must be {expected}, got {got}"))
}

/// Ordered schema of property renderers for one resource type.
#[derive(Debug, Clone, Default)]
pub struct Props {
    entries: IndexMap<&'static str, Prop>,
}

impl Props {
    pub fn new() -> Self {
        Props::default()
    }

    /// Declares the next attribute. Declaration order is clause order.
    pub fn attr(mut self, name: &'static str, prop: Prop) -> Self {
        self.entries.insert(name, prop);
        self
    }

    /// Renders all present attributes in schema declaration order. Attributes
    /// in `data` but not in the schema fail the call; a silently dropped
    /// attribute would be a correctness bug in infrastructure tooling.
    pub fn render(&self, data: &Attributes) -> Result<String, CompileError> {
        for attr in data.keys() {
            if !self.entries.contains_key(attr.as_str()) {
                return Err(CompileError::UnknownAttribute(attr.clone()));
            }
        }

        let mut clauses = Vec::new();
        for (attr, prop) in &self.entries {
            let Some(value) = data.get(*attr) else { continue };
            if let Some(clause) = prop.render(attr, value)? {
                clauses.push(clause);
            }
        }
        Ok(clauses.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn view_props() -> Props {
        Props::new()
            .attr("secure", Prop::Flag("SECURE"))
            .attr("change_tracking", Prop::Bool("CHANGE_TRACKING"))
            .attr("comment", Prop::String("COMMENT"))
            .attr("as_", Prop::Query("AS"))
    }

    #[test]
    fn renders_in_schema_order_not_caller_order() {
        let mut data = Attributes::new();
        data.insert("as_".into(), json!("SELECT 1"));
        data.insert("comment".into(), json!("latest"));
        data.insert("secure".into(), json!(true));

        let sql = view_props().render(&data).unwrap();
        assert_eq!(sql, "SECURE COMMENT = 'latest' AS SELECT 1");
    }

    #[test]
    fn skips_null_and_false_flag_values() {
        let mut data = Attributes::new();
        data.insert("secure".into(), json!(false));
        data.insert("comment".into(), json!(null));
        assert_eq!(view_props().render(&data).unwrap(), "");
    }

    #[test]
    fn escapes_embedded_quotes_in_string_literals() {
        let mut data = Attributes::new();
        data.insert("comment".into(), json!("it's fine"));
        assert_eq!(view_props().render(&data).unwrap(), "COMMENT = 'it''s fine'");
    }

    #[test]
    fn unknown_attribute_fails_loudly() {
        let mut data = Attributes::new();
        data.insert("colour".into(), json!("red"));
        let err = view_props().render(&data).unwrap_err();
        assert!(matches!(err, CompileError::UnknownAttribute(attr) if attr == "colour"));
    }

    #[test]
    fn tags_render_as_parenthesized_pairs() {
        let props = Props::new().attr("tags", Prop::Tags);
        let mut data = Attributes::new();
        data.insert("tags".into(), json!({"env": "prod", "team": "data"}));
        assert_eq!(props.render(&data).unwrap(), "TAG (env='prod', team='data')");
    }

    #[test]
    fn integers_and_identifiers_render_unquoted() {
        let props = Props::new()
            .attr("max_cluster_count", Prop::Int("MAX_CLUSTER_COUNT"))
            .attr("resource_monitor", Prop::Identifier("RESOURCE_MONITOR"));
        let mut data = Attributes::new();
        data.insert("max_cluster_count".into(), json!(4));
        data.insert("resource_monitor".into(), json!("MONITOR_1"));
        assert_eq!(
            props.render(&data).unwrap(),
            "MAX_CLUSTER_COUNT = 4 RESOURCE_MONITOR = MONITOR_1"
        );
    }

    #[test]
    fn wrong_value_type_is_a_shape_error() {
        let mut data = Attributes::new();
        data.insert("change_tracking".into(), json!("yes"));
        let err = view_props().render(&data).unwrap_err();
        assert!(matches!(err, CompileError::InvalidRequestShape { .. }));
    }
}
