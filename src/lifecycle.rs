//! The lifecycle compiler. Four verb families (create, update, drop,
//! transfer), each with a default statement shape and per-resource-type
//! overrides for the corners where Snowflake's grammar is irregular: DDL
//! verbs that differ per object kind, modifiers that must precede the type
//! keyword, grant-shaped objects that compile to GRANT/REVOKE, and one
//! object kind that is configured through a stored procedure call instead
//! of DDL.

use serde_json::Value;
use tracing::warn;

use crate::error::CompileError;
use crate::identifier::{Urn, quote_identifier};
use crate::props::{Attributes, Props, quote_literal, render_tag_pairs, sql_value};
use crate::resource::ResourceType;
use crate::stmt;

type Sql = Result<String, CompileError>;

// ---------------------------------------------------------------------------
// attribute access helpers

fn require_str<'a>(data: &'a Attributes, attr: &str) -> Result<&'a str, CompileError> {
    match data.get(attr) {
        Some(Value::String(text)) => Ok(text),
        Some(Value::Null) | None => Err(CompileError::bad_shape(format!("attribute `{attr}` is required"))),
        Some(other) => Err(CompileError::bad_shape(format!(
            "attribute `{attr}` must be a string, got {other}"
        ))),
    }
}

fn opt_str<'a>(data: &'a Attributes, attr: &str) -> Option<&'a str> {
    match data.get(attr) {
        Some(Value::String(text)) => Some(text),
        _ => None,
    }
}

fn flag(data: &Attributes, attr: &str) -> bool {
    matches!(data.get(attr), Some(Value::Bool(true)))
}

/// Removes `attr` from a private copy of the data so the generic renderer
/// does not emit it a second time.
fn take_flag(data: &mut Attributes, attr: &str) -> bool {
    data.shift_remove(attr)
        .is_some_and(|value| matches!(value, Value::Bool(true)))
}

fn value_str<'a>(attr: &str, value: &'a Value) -> Result<&'a str, CompileError> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(CompileError::bad_shape(format!(
            "attribute `{attr}` must be a string, got {other}"
        ))),
    }
}

/// Update calls carry exactly one changed attribute.
fn single_change(data: &Attributes) -> Result<(&str, &Value), CompileError> {
    let mut entries = data.iter();
    match (entries.next(), entries.next()) {
        (Some((attr, value)), None) => Ok((attr.as_str(), value)),
        _ => Err(CompileError::bad_shape(format!(
            "update requires exactly one changed attribute, got {}",
            data.len()
        ))),
    }
}

// ---------------------------------------------------------------------------
// grant vocabulary

/// Snowflake accepts only the bare word INTEGRATION in grant ON-clauses, no
/// matter which integration flavor the object is.
fn normalize_on_type(on_type: &str) -> String {
    let on_type = on_type.to_uppercase();
    if on_type.contains("INTEGRATION") {
        "INTEGRATION".to_string()
    } else {
        on_type
    }
}

/// `ON ALL` / `ON FUTURE` clauses take the plural noun: TABLES, SCHEMAS,
/// MASKING POLICIES.
fn pluralize(noun: &str) -> String {
    let noun = noun.to_uppercase();
    if let Some(stem) = noun.strip_suffix('Y') {
        format!("{stem}IES")
    } else if noun.ends_with('S') {
        noun
    } else {
        format!("{noun}S")
    }
}

/// Scanner packages are configured through the Trust Center procedure, not
/// DDL. `value` arrives already rendered as a SQL argument.
fn set_scanner_configuration(setting: &str, value: &str, package: &str) -> String {
    format!(
        "CALL SNOWFLAKE.TRUST_CENTER.SET_CONFIGURATION({}, {}, {})",
        quote_literal(setting),
        value,
        quote_literal(package)
    )
}

// ---------------------------------------------------------------------------
// create

pub fn compile_create(urn: &Urn, data: &Attributes, props: &Props, if_not_exists: bool) -> Sql {
    match urn.resource_type {
        ResourceType::AccountParameter => create_account_parameter(urn, data),
        ResourceType::AggregationPolicy => create_aggregation_policy(urn, data, props, if_not_exists),
        ResourceType::Database | ResourceType::Schema | ResourceType::Table => {
            create_transient_kind(urn, data, props, if_not_exists)
        }
        ResourceType::View => create_view(urn, data, props, if_not_exists),
        ResourceType::MaskingPolicy => create_masking_policy(urn, data, props, if_not_exists),
        ResourceType::Procedure => create_procedure(urn, data, props, if_not_exists),
        ResourceType::Grant => create_grant(data),
        ResourceType::GrantOnAll => create_grant_on_all(data),
        ResourceType::FutureGrant => create_future_grant(data),
        ResourceType::RoleGrant => create_role_grant(data),
        ResourceType::DatabaseRoleGrant => create_database_role_grant(data),
        ResourceType::TagReference => create_tag_reference(data),
        ResourceType::ScannerPackage => Ok(set_scanner_configuration("ENABLED", "'TRUE'", &urn.fqn.name)),
        _ => create_default(urn, data, props, if_not_exists),
    }
}

fn create_default(urn: &Urn, data: &Attributes, props: &Props, if_not_exists: bool) -> Sql {
    Ok(stmt![
        "CREATE",
        urn.resource_type,
        if_not_exists.then_some("IF NOT EXISTS"),
        &urn.fqn,
        props.render(data)?,
    ])
}

/// Account parameters have no CREATE form; setting one is itself an ALTER.
/// String values are quoted, anything else passes verbatim.
fn create_account_parameter(urn: &Urn, data: &Attributes) -> Sql {
    let value = data
        .get("value")
        .ok_or_else(|| CompileError::bad_shape("attribute `value` is required".to_string()))?;
    Ok(stmt![
        "ALTER ACCOUNT SET",
        quote_identifier(&urn.fqn.name),
        "=",
        sql_value(value),
    ])
}

fn create_aggregation_policy(urn: &Urn, data: &Attributes, props: &Props, if_not_exists: bool) -> Sql {
    Ok(stmt![
        "CREATE",
        urn.resource_type,
        if_not_exists.then_some("IF NOT EXISTS"),
        &urn.fqn,
        "AS () RETURNS AGGREGATION_CONSTRAINT",
        props.render(data)?,
    ])
}

/// Databases, schemas and tables accept TRANSIENT before the type keyword.
/// The attribute is stripped from a copy of the data so the property
/// renderer does not emit it again.
fn create_transient_kind(urn: &Urn, data: &Attributes, props: &Props, if_not_exists: bool) -> Sql {
    let mut data = data.clone();
    let transient = take_flag(&mut data, "transient");
    Ok(stmt![
        "CREATE",
        transient.then_some("TRANSIENT"),
        urn.resource_type,
        if_not_exists.then_some("IF NOT EXISTS"),
        &urn.fqn,
        props.render(&data)?,
    ])
}

fn create_view(urn: &Urn, data: &Attributes, props: &Props, if_not_exists: bool) -> Sql {
    let mut data = data.clone();
    let secure = take_flag(&mut data, "secure");
    let volatile = take_flag(&mut data, "volatile");
    let recursive = take_flag(&mut data, "recursive");
    Ok(stmt![
        "CREATE",
        secure.then_some("SECURE"),
        volatile.then_some("VOLATILE"),
        recursive.then_some("RECURSIVE"),
        urn.resource_type,
        if_not_exists.then_some("IF NOT EXISTS"),
        &urn.fqn,
        props.render(&data)?,
    ])
}

fn create_masking_policy(urn: &Urn, data: &Attributes, props: &Props, if_not_exists: bool) -> Sql {
    Ok(stmt![
        "CREATE",
        urn.resource_type,
        if_not_exists.then_some("IF NOT EXISTS"),
        &urn.fqn,
        "AS",
        props.render(data)?,
    ])
}

fn create_procedure(urn: &Urn, data: &Attributes, props: &Props, if_not_exists: bool) -> Sql {
    if if_not_exists {
        return Err(CompileError::unsupported(
            urn.resource_type,
            "CREATE PROCEDURE does not accept IF NOT EXISTS",
        ));
    }
    Ok(stmt!["CREATE", urn.resource_type, &urn.fqn, props.render(data)?])
}

fn create_grant(data: &Attributes) -> Sql {
    let privilege = require_str(data, "priv")?;
    let on_type = normalize_on_type(require_str(data, "on_type")?);
    // Account-level grants name no target object.
    let on = (on_type != "ACCOUNT").then(|| require_str(data, "on")).transpose()?;
    Ok(stmt![
        "GRANT",
        privilege,
        "ON",
        on_type,
        on,
        "TO",
        require_str(data, "to_type")?,
        require_str(data, "to")?,
        flag(data, "grant_option").then_some("WITH GRANT OPTION"),
    ])
}

fn create_grant_on_all(data: &Attributes) -> Sql {
    Ok(stmt![
        "GRANT",
        require_str(data, "priv")?,
        "ON ALL",
        pluralize(&normalize_on_type(require_str(data, "on_type")?)),
        "IN",
        require_str(data, "in_type")?,
        require_str(data, "in_name")?,
        "TO",
        require_str(data, "to_type")?,
        require_str(data, "to")?,
        flag(data, "copy_current_grants").then_some("COPY CURRENT GRANTS"),
    ])
}

fn create_future_grant(data: &Attributes) -> Sql {
    Ok(stmt![
        "GRANT",
        require_str(data, "priv")?,
        "ON FUTURE",
        pluralize(&normalize_on_type(require_str(data, "on_type")?)),
        "IN",
        require_str(data, "in_type")?,
        require_str(data, "in_name")?,
        "TO",
        require_str(data, "to_type")?,
        require_str(data, "to")?,
    ])
}

fn create_role_grant(data: &Attributes) -> Sql {
    let role = require_str(data, "role")?;
    let (to_type, to) = match opt_str(data, "to_role") {
        Some(to_role) => ("ROLE", to_role),
        None => ("USER", require_str(data, "to_user")?),
    };
    Ok(stmt!["GRANT ROLE", quote_identifier(role), "TO", to_type, quote_identifier(to)])
}

fn create_database_role_grant(data: &Attributes) -> Sql {
    let database_role = require_str(data, "database_role")?;
    let (to_type, to) = match opt_str(data, "to_role") {
        Some(to_role) => ("ROLE", to_role),
        None => ("DATABASE ROLE", require_str(data, "to_database_role")?),
    };
    Ok(stmt![
        "GRANT DATABASE ROLE",
        quote_identifier(database_role),
        "TO",
        to_type,
        quote_identifier(to),
    ])
}

/// Tag references attach tags to an existing object, so "creating" one is an
/// ALTER on the tagged object.
fn create_tag_reference(data: &Attributes) -> Sql {
    let domain = require_str(data, "object_domain")?.to_uppercase();
    let name = require_str(data, "object_name")?;
    let Some(Value::Object(tags)) = data.get("tags") else {
        return Err(CompileError::bad_shape(
            "attribute `tags` must be a mapping of tag names to values".to_string(),
        ));
    };
    Ok(stmt!["ALTER", domain, name, "SET TAG", render_tag_pairs(tags)?])
}

// ---------------------------------------------------------------------------
// update

pub fn compile_update(urn: &Urn, data: &Attributes, props: &Props) -> Sql {
    let (attr, value) = single_change(data)?;
    match urn.resource_type {
        ResourceType::AccountParameter => update_account_parameter(urn, attr, value),
        ResourceType::Schema => update_schema(urn, attr, value),
        ResourceType::Table | ResourceType::IcebergTable => update_table(urn, attr, value, props),
        ResourceType::EventTable => {
            // Event tables are altered with the plain TABLE keyword.
            let urn = Urn {
                resource_type: ResourceType::Table,
                ..urn.clone()
            };
            update_default(&urn, attr, value, props)
        }
        ResourceType::Task => update_task(urn, attr, value, props),
        ResourceType::Procedure => update_procedure(urn, attr, value, props),
        ResourceType::ScannerPackage => update_scanner_package(urn, attr, value),
        ResourceType::Grant
        | ResourceType::GrantOnAll
        | ResourceType::FutureGrant
        | ResourceType::RoleGrant
        | ResourceType::DatabaseRoleGrant
        | ResourceType::TagReference => Err(CompileError::unsupported(
            urn.resource_type,
            "grants and tag references are dropped and recreated, not altered in place",
        )),
        _ => update_default(urn, attr, value, props),
    }
}

fn update_default(urn: &Urn, attr: &str, value: &Value, props: &Props) -> Sql {
    if attr == "owner" {
        return Err(CompileError::unsupported(
            urn.resource_type,
            "ownership changes go through compile_transfer",
        ));
    }
    if value.is_null() {
        return Ok(stmt!["ALTER", urn.resource_type, &urn.fqn, "UNSET", attr.to_uppercase()]);
    }
    if attr == "name" {
        return Ok(stmt![
            "ALTER",
            urn.resource_type,
            &urn.fqn,
            "RENAME TO",
            quote_identifier(value_str(attr, value)?),
        ]);
    }

    let mut change = Attributes::new();
    change.insert(attr.to_string(), value.clone());
    let clause = props.render(&change)?;
    if clause.is_empty() {
        return Err(CompileError::bad_shape(format!(
            "attribute `{attr}` renders no clause; use a null value to UNSET it"
        )));
    }
    Ok(stmt!["ALTER", urn.resource_type, &urn.fqn, "SET", clause])
}

fn update_account_parameter(urn: &Urn, attr: &str, value: &Value) -> Sql {
    if attr != "value" || value.is_null() {
        return Err(CompileError::bad_shape(
            "account parameters update only their non-null `value` attribute".to_string(),
        ));
    }
    Ok(stmt![
        "ALTER ACCOUNT SET",
        quote_identifier(&urn.fqn.name),
        "=",
        sql_value(value),
    ])
}

fn update_schema(urn: &Urn, attr: &str, value: &Value) -> Sql {
    match attr {
        "transient" => Err(CompileError::unsupported(
            urn.resource_type,
            "the transient flag is fixed at creation",
        )),
        "owner" => Err(CompileError::unsupported(
            urn.resource_type,
            "ownership changes go through compile_transfer",
        )),
        _ if value.is_null() => Ok(stmt!["ALTER SCHEMA", &urn.fqn, "UNSET", attr.to_uppercase()]),
        "name" => Ok(stmt![
            "ALTER SCHEMA",
            &urn.fqn,
            "RENAME TO",
            quote_identifier(value_str(attr, value)?),
        ]),
        "managed_access" => {
            let verb = if matches!(value, Value::Bool(true)) { "ENABLE" } else { "DISABLE" };
            Ok(stmt!["ALTER SCHEMA", &urn.fqn, verb, "MANAGED ACCESS"])
        }
        _ => Ok(stmt![
            "ALTER SCHEMA",
            &urn.fqn,
            "SET",
            attr.to_uppercase(),
            "=",
            sql_value(value),
        ]),
    }
}

fn update_table(urn: &Urn, attr: &str, value: &Value, props: &Props) -> Sql {
    if attr == "columns" {
        return Err(CompileError::unsupported(
            urn.resource_type,
            "column changes require a column-level statement shape",
        ));
    }
    update_default(urn, attr, value, props)
}

fn update_task(urn: &Urn, attr: &str, value: &Value, props: &Props) -> Sql {
    match attr {
        "as_" => Ok(stmt!["ALTER TASK", &urn.fqn, "MODIFY AS", value_str(attr, value)?]),
        "when" if value.is_null() => Ok(stmt!["ALTER TASK", &urn.fqn, "REMOVE WHEN"]),
        "when" => Ok(stmt!["ALTER TASK", &urn.fqn, "MODIFY WHEN", value_str(attr, value)?]),
        "state" => {
            let verb = if value_str(attr, value)? == "STARTED" { "RESUME" } else { "SUSPEND" };
            Ok(stmt!["ALTER TASK", &urn.fqn, verb])
        }
        // The predecessor list is stateful: computing its new value needs the
        // current one, which this compiler never has.
        "after" => Err(CompileError::unsupported(
            urn.resource_type,
            "task predecessors cannot be changed without knowing their current value",
        )),
        _ => update_default(urn, attr, value, props),
    }
}

fn update_procedure(urn: &Urn, attr: &str, value: &Value, props: &Props) -> Sql {
    if attr == "execute_as" {
        return Ok(stmt!["ALTER", urn.resource_type, &urn.fqn, "EXECUTE AS", value_str(attr, value)?]);
    }
    update_default(urn, attr, value, props)
}

fn update_scanner_package(urn: &Urn, attr: &str, value: &Value) -> Sql {
    let rendered = match value {
        Value::String(text) if attr == "schedule" => quote_literal(&format!("USING CRON {text}")),
        Value::String(text) => quote_literal(text),
        Value::Bool(true) => quote_literal("TRUE"),
        Value::Bool(false) => quote_literal("FALSE"),
        Value::Number(number) => quote_literal(&number.to_string()),
        other => {
            return Err(CompileError::bad_shape(format!(
                "attribute `{attr}` must be a scalar, got {other}"
            )));
        }
    };
    // Configuration keys are procedure arguments, not keywords; pass them
    // through as the caller spelled them.
    Ok(set_scanner_configuration(attr, &rendered, &urn.fqn.name))
}

// ---------------------------------------------------------------------------
// drop

pub fn compile_drop(urn: &Urn, data: &Attributes, if_exists: bool) -> Sql {
    match urn.resource_type {
        ResourceType::AccountParameter => Ok(stmt!["ALTER ACCOUNT UNSET", quote_identifier(&urn.fqn.name)]),
        ResourceType::Database => Ok(stmt![
            "DROP DATABASE",
            if_exists.then_some("IF EXISTS"),
            &urn.fqn,
            "RESTRICT",
        ]),
        ResourceType::Grant => drop_grant(urn, data),
        ResourceType::GrantOnAll => drop_grant_on_all(data),
        ResourceType::FutureGrant => drop_future_grant(data),
        ResourceType::RoleGrant => drop_role_grant(data),
        ResourceType::DatabaseRoleGrant => drop_database_role_grant(data),
        ResourceType::ScannerPackage => Ok(set_scanner_configuration("ENABLED", "'FALSE'", &urn.fqn.name)),
        _ => Ok(stmt!["DROP", urn.resource_type, if_exists.then_some("IF EXISTS"), &urn.fqn]),
    }
}

fn drop_grant(urn: &Urn, data: &Attributes) -> Sql {
    let privilege = require_str(data, "priv")?;
    if privilege.eq_ignore_ascii_case("OWNERSHIP") {
        return Err(CompileError::unsupported(
            urn.resource_type,
            "ownership cannot be revoked; transfer it to another role instead",
        ));
    }
    if flag(data, "grant_option") {
        warn!(privilege, "revoke does not render the grant option modifier; emitting without it");
    }
    let on_type = normalize_on_type(require_str(data, "on_type")?);
    let on = (on_type != "ACCOUNT").then(|| require_str(data, "on")).transpose()?;
    Ok(stmt![
        "REVOKE",
        privilege,
        "ON",
        on_type,
        on,
        "FROM",
        require_str(data, "to_type")?,
        require_str(data, "to")?,
    ])
}

fn drop_grant_on_all(data: &Attributes) -> Sql {
    Ok(stmt![
        "REVOKE",
        require_str(data, "priv")?,
        "ON ALL",
        pluralize(&normalize_on_type(require_str(data, "on_type")?)),
        "IN",
        require_str(data, "in_type")?,
        require_str(data, "in_name")?,
        "FROM",
        require_str(data, "to_type")?,
        require_str(data, "to")?,
    ])
}

fn drop_future_grant(data: &Attributes) -> Sql {
    if flag(data, "grant_option") {
        warn!("revoke does not render the grant option modifier; emitting without it");
    }
    Ok(stmt![
        "REVOKE",
        require_str(data, "priv")?,
        "ON FUTURE",
        pluralize(&normalize_on_type(require_str(data, "on_type")?)),
        "IN",
        require_str(data, "in_type")?,
        require_str(data, "in_name")?,
        "FROM",
        require_str(data, "to_type")?,
        require_str(data, "to")?,
    ])
}

fn drop_role_grant(data: &Attributes) -> Sql {
    let role = require_str(data, "role")?;
    let (from_type, from) = match opt_str(data, "to_role") {
        Some(to_role) => ("ROLE", to_role),
        None => ("USER", require_str(data, "to_user")?),
    };
    Ok(stmt!["REVOKE ROLE", quote_identifier(role), "FROM", from_type, quote_identifier(from)])
}

fn drop_database_role_grant(data: &Attributes) -> Sql {
    let database_role = require_str(data, "database_role")?;
    let (from_type, from) = match opt_str(data, "to_role") {
        Some(to_role) => ("ROLE", to_role),
        None => ("DATABASE ROLE", require_str(data, "to_database_role")?),
    };
    Ok(stmt![
        "REVOKE DATABASE ROLE",
        quote_identifier(database_role),
        "FROM",
        from_type,
        quote_identifier(from),
    ])
}

// ---------------------------------------------------------------------------
// transfer

pub fn compile_transfer(
    urn: &Urn,
    owner: &str,
    owner_type: ResourceType,
    copy_current_grants: bool,
    revoke_current_grants: bool,
) -> Sql {
    Ok(stmt![
        "GRANT OWNERSHIP ON",
        urn.resource_type,
        &urn.fqn,
        "TO",
        owner_type,
        quote_identifier(owner),
        revoke_current_grants.then_some("REVOKE CURRENT GRANTS"),
        copy_current_grants.then_some("COPY CURRENT GRANTS"),
    ])
}
