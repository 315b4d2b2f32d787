//! Structured edit actions returned by the suggester

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /api/ai/suggest`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuggestRequest {
    #[serde(default)]
    pub prompt: String,
    /// Current protocol document, passed through untouched
    #[serde(default)]
    pub protocol: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub actions: Vec<SuggestedAction>,
}

/// One edit the client should apply, keyed by `type`
///
/// Unrecognised action types decode as [`SuggestedAction::Noop`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SuggestedAction {
    AddColumn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preset: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<String>,
    },
    RemoveColumn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ColumnRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<i64>,
    },
    ReorderColumn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ColumnRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_index: Option<i64>,
    },
    UpdateColumn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ColumnRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<i64>,
        #[serde(default)]
        changes: Map<String, Value>,
    },
    SetColumns {
        #[serde(default)]
        columns: Vec<ColumnSpec>,
    },
    SetScoringConfigs {
        #[serde(default)]
        scoring_configs: Vec<ScoringConfigSpec>,
    },
    ApplyTemplate {
        #[serde(default)]
        template_key: String,
    },
    SetProtocolMeta {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        protocol_id: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version_number: Option<i64>,
    },
    SaveProtocol {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    LoadProtocol {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<ProtocolRef>,
    },
    #[serde(other)]
    Noop,
}

/// Column addressed by id, name or position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_index: Option<i64>,
}

/// Stored protocol id or a protocol name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProtocolRef {
    Id(i64),
    Name(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfigSpec {
    #[serde(default)]
    pub trigger_column: String,
    /// `neither`, `positive` or `negative`
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub require_negative: bool,
    #[serde(default)]
    pub require_positive: bool,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
    #[serde(default)]
    pub updates: Vec<UpdateSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub col: String,
    pub op: String,
    pub thresh: String,
    /// `zero`, `negative` or `positive`
    #[serde(default)]
    pub base: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSpec {
    pub col: String,
    pub val: String,
}
