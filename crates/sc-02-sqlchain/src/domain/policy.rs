//! Project configuration records and query admission.
//!
//! Records are stored as JSON values and decoded into typed structs on read.
//! Admission fails closed: a record that does not decode denies the query.
//!
//! Only the misc and table records gate queries. OAuth and group records are
//! stored for the proxy in front of the chain, which knows the end user.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::Query;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Key of the project-wide misc record.
pub const MISC_CONFIG_KEY: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectConfigType {
    Misc,
    OAuth,
    Table,
    Group,
}

impl fmt::Display for ProjectConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Misc => "Misc",
            Self::OAuth => "OAuth",
            Self::Table => "Table",
            Self::Group => "Group",
        };
        f.write_str(name)
    }
}

/// One stored configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub kind: ProjectConfigType,
    /// Table name for `Table`, provider for `OAuth`, [`MISC_CONFIG_KEY`] for `Misc`.
    pub key: String,
    pub value: serde_json::Value,
    pub created: u64,
    pub last_updated: u64,
}

impl ProjectConfig {
    pub fn new(kind: ProjectConfigType, key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            kind,
            key: key.into(),
            value,
            created: 0,
            last_updated: 0,
        }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMiscConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_sign_up: Option<bool>,
    #[serde(default, rename = "sign_up_verify", skip_serializing_if = "Option::is_none")]
    pub enable_sign_up_verification: Option<bool>,
    /// Session lifetime in seconds.
    #[serde(default)]
    pub session_age: u64,
}

impl ProjectMiscConfig {
    /// Only an explicit `enabled: true` enables the project.
    pub fn is_enabled(&self) -> bool {
        self.enabled == Some(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectTableConfig {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
    #[serde(default)]
    pub rules: serde_json::Value,
    #[serde(default)]
    pub primary_key: String,
    #[serde(default, rename = "is_auto_increment")]
    pub auto_increment: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Why a query was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdmissionDenial {
    #[error("project is disabled")]
    ProjectDisabled,

    #[error("table {0} is deleted")]
    TableDeleted(String),

    #[error("malformed {kind} config for key {key:?}")]
    Malformed { kind: ProjectConfigType, key: String },
}

/// Check `query` against the project's records.
///
/// `lookup(kind, key)` returns the stored record, if any. Absent records
/// impose no restriction.
pub fn check_admission<F>(query: &Query, lookup: F) -> Result<(), AdmissionDenial>
where
    F: Fn(ProjectConfigType, &str) -> Option<ProjectConfig>,
{
    if let Some(record) = lookup(ProjectConfigType::Misc, MISC_CONFIG_KEY) {
        let misc: ProjectMiscConfig = record.decode().map_err(|_| AdmissionDenial::Malformed {
            kind: ProjectConfigType::Misc,
            key: MISC_CONFIG_KEY.to_string(),
        })?;
        if !misc.is_enabled() {
            return Err(AdmissionDenial::ProjectDisabled);
        }
    }

    for table in &query.payload.tables {
        if let Some(record) = lookup(ProjectConfigType::Table, table) {
            let config: ProjectTableConfig =
                record.decode().map_err(|_| AdmissionDenial::Malformed {
                    kind: ProjectConfigType::Table,
                    key: table.clone(),
                })?;
            if config.is_deleted {
                return Err(AdmissionDenial::TableDeleted(table.clone()));
            }
        }
    }

    Ok(())
}
