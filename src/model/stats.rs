//! Usage statistics snapshot returned by `/api/stats`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Aggregate usage over a trailing window. Replaced wholesale on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    #[serde(default)]
    pub counts: UsageCounts,

    /// Command or keyword -> number of uses within the window
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage_stats: HashMap<String, u64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub recent_logs: Vec<UsageLog>,

    #[serde(default)]
    pub days: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounts {
    #[serde(default)]
    pub groups: u64,
    #[serde(default)]
    pub commands: u64,
    #[serde(default)]
    pub auto_responses: u64,
}

/// One recorded invocation of a command or auto response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLog {
    #[serde(default)]
    pub id: i64,
    /// "learning_command" or "auto_response"
    #[serde(default)]
    pub command_type: String,
    pub command_value: String,
    #[serde(default)]
    pub group_jid: String,
    #[serde(default)]
    pub response_type: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub used_at: Option<DateTime<Utc>>,
}

impl UsageSnapshot {
    /// Most used keys, highest count first; ties broken by key
    pub fn top_commands(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .usage_stats
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }

    /// Number of distinct keys used within the window
    pub fn distinct_used(&self) -> usize {
        self.usage_stats.len()
    }
}

/// Go encodes empty maps and slices as `null`
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
