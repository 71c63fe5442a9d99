use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of Snowflake object kinds the lifecycle compiler knows how
/// to emit statements for. Each kind carries the keyword used in DDL text and
/// a stable lowercase label used in URNs and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    AccountParameter,
    AggregationPolicy,
    Database,
    DatabaseRole,
    DatabaseRoleGrant,
    EventTable,
    Function,
    FutureGrant,
    Grant,
    GrantOnAll,
    IcebergTable,
    MaskingPolicy,
    Procedure,
    Role,
    RoleGrant,
    ScannerPackage,
    Schema,
    Stage,
    Table,
    TagReference,
    Task,
    User,
    View,
    Warehouse,
}

impl ResourceType {
    /// The keyword this object kind uses in DDL statements, e.g. `MASKING POLICY`.
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            ResourceType::AccountParameter => "ACCOUNT PARAMETER",
            ResourceType::AggregationPolicy => "AGGREGATION POLICY",
            ResourceType::Database => "DATABASE",
            ResourceType::DatabaseRole => "DATABASE ROLE",
            ResourceType::DatabaseRoleGrant => "DATABASE ROLE GRANT",
            ResourceType::EventTable => "EVENT TABLE",
            ResourceType::Function => "FUNCTION",
            ResourceType::FutureGrant => "FUTURE GRANT",
            ResourceType::Grant => "GRANT",
            ResourceType::GrantOnAll => "GRANT ON ALL",
            ResourceType::IcebergTable => "ICEBERG TABLE",
            ResourceType::MaskingPolicy => "MASKING POLICY",
            ResourceType::Procedure => "PROCEDURE",
            ResourceType::Role => "ROLE",
            ResourceType::RoleGrant => "ROLE GRANT",
            ResourceType::ScannerPackage => "SCANNER PACKAGE",
            ResourceType::Schema => "SCHEMA",
            ResourceType::Stage => "STAGE",
            ResourceType::Table => "TABLE",
            ResourceType::TagReference => "TAG REFERENCE",
            ResourceType::Task => "TASK",
            ResourceType::User => "USER",
            ResourceType::View => "VIEW",
            ResourceType::Warehouse => "WAREHOUSE",
        }
    }

    /// Stable snake_case label, used in URN display and error messages.
    /// Never derived from user input.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::AccountParameter => "account_parameter",
            ResourceType::AggregationPolicy => "aggregation_policy",
            ResourceType::Database => "database",
            ResourceType::DatabaseRole => "database_role",
            ResourceType::DatabaseRoleGrant => "database_role_grant",
            ResourceType::EventTable => "event_table",
            ResourceType::Function => "function",
            ResourceType::FutureGrant => "future_grant",
            ResourceType::Grant => "grant",
            ResourceType::GrantOnAll => "grant_on_all",
            ResourceType::IcebergTable => "iceberg_table",
            ResourceType::MaskingPolicy => "masking_policy",
            ResourceType::Procedure => "procedure",
            ResourceType::Role => "role",
            ResourceType::RoleGrant => "role_grant",
            ResourceType::ScannerPackage => "scanner_package",
            ResourceType::Schema => "schema",
            ResourceType::Stage => "stage",
            ResourceType::Table => "table",
            ResourceType::TagReference => "tag_reference",
            ResourceType::Task => "task",
            ResourceType::User => "user",
            ResourceType::View => "view",
            ResourceType::Warehouse => "warehouse",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_keyword())
    }
}
