//! Protocol record and command types

use crate::{ApplicationError, ApplicationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Who may read a protocol besides its owner
///
/// Serialized as the `is_public` boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

impl From<bool> for Visibility {
    fn from(is_public: bool) -> Self {
        if is_public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_public())
    }
}

/// Which protocols a listing includes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListScope {
    /// Only the caller's own protocols
    Mine,
    /// The caller's protocols plus everyone's public ones
    #[default]
    MineAndPublic,
}

impl ListScope {
    /// Parse the `scope` query parameter; anything unrecognised lists all
    pub fn from_query(scope: Option<&str>) -> Self {
        match scope {
            Some("account") | Some("mine") => ListScope::Mine,
            _ => ListScope::MineAndPublic,
        }
    }
}

/// Listing entry; the payload is left out
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolSummary {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "is_public")]
    pub visibility: Visibility,
}

/// A single protocol with its payload
#[derive(Debug, Clone, Serialize)]
pub struct Protocol {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub name: String,
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "is_public")]
    pub visibility: Visibility,
}

/// Create-or-update input
#[derive(Debug, Clone)]
pub struct SaveProtocol {
    pub id: Option<i64>,
    pub name: String,
    pub data: String,
}

/// How a save landed
///
/// Callers over HTTP only see the resulting id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Updated { id: i64 },
    Created { id: i64 },
    /// A non-owner's edit copied into a new row
    Forked { id: i64, source: i64 },
}

impl SaveOutcome {
    pub fn id(&self) -> i64 {
        match *self {
            SaveOutcome::Updated { id }
            | SaveOutcome::Created { id }
            | SaveOutcome::Forked { id, .. } => id,
        }
    }
}

/// Body of `POST /api/protocols`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProtocolRequest {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub delete: bool,
    #[serde(default)]
    pub make_public: bool,
}

/// The single mutation a request asks for
#[derive(Debug, Clone)]
pub enum ProtocolCommand {
    Delete { id: i64 },
    Publish { id: i64 },
    Save(SaveProtocol),
}

/// Result of [`ProtocolCommand`] execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Deleted,
    Published { id: i64 },
    Saved(SaveOutcome),
}

impl ProtocolRequest {
    /// Decide which mutation the request shape selects
    ///
    /// Delete and publish are mutually exclusive, and neither carries a
    /// name or payload change.
    pub fn into_command(self) -> ApplicationResult<ProtocolCommand> {
        if self.delete && self.make_public {
            return Err(ApplicationError::validation(
                "cannot combine delete and makePublic",
            ));
        }

        if self.delete {
            if self.id <= 0 {
                return Err(ApplicationError::validation("id required for delete"));
            }
            return Ok(ProtocolCommand::Delete { id: self.id });
        }

        if self.make_public {
            if self.id <= 0 {
                return Err(ApplicationError::validation("id required to make public"));
            }
            return Ok(ProtocolCommand::Publish { id: self.id });
        }

        Ok(ProtocolCommand::Save(SaveProtocol {
            id: (self.id > 0).then_some(self.id),
            name: self.name,
            data: self.data,
        }))
    }
}
