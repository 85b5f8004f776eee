/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mutation kinds recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Insert,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Insert => "INSERT",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }
}

/// Why an audit entry was written: a user mutation, or a compensating step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOrigin {
    Mutation,
    Undo,
    Redo,
}

impl AuditOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOrigin::Mutation => "mutation",
            AuditOrigin::Undo => "undo",
            AuditOrigin::Redo => "redo",
        }
    }
}

/// Tables that produce audit entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Users,
    Folders,
    Plans,
    Projects,
}

impl TableName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Users => "users",
            TableName::Folders => "folders",
            TableName::Plans => "plans",
            TableName::Projects => "projects",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseTypeError {
    kind: &'static str,
    value: String,
}

impl FromStr for AuditAction {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(AuditAction::Insert),
            "UPDATE" => Ok(AuditAction::Update),
            "DELETE" => Ok(AuditAction::Delete),
            other => Err(ParseTypeError { kind: "audit action", value: other.to_string() }),
        }
    }
}

impl FromStr for AuditOrigin {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mutation" => Ok(AuditOrigin::Mutation),
            "undo" => Ok(AuditOrigin::Undo),
            "redo" => Ok(AuditOrigin::Redo),
            other => Err(ParseTypeError { kind: "audit origin", value: other.to_string() }),
        }
    }
}

impl FromStr for TableName {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(TableName::Users),
            "folders" => Ok(TableName::Folders),
            "plans" => Ok(TableName::Plans),
            "projects" => Ok(TableName::Projects),
            other => Err(ParseTypeError { kind: "table", value: other.to_string() }),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
