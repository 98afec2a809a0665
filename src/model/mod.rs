//! Records read from the backend and payloads sent back to it
//!
//! Records are addressed by their natural key (group JID, command token,
//! keyword), never by the surrogate `id`. Payloads carry only the fields the
//! console owns: usage counters and timestamps stay server-side.

mod stats;
mod variant;

pub use stats::{UsageCounts, UsageLog, UsageSnapshot};
pub use variant::{AutoResponseVariant, CommandVariant, ModifyType, UploadCategory};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub(crate) use stats::null_as_default;

/// The collections managed through the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Group,
    Command,
    AutoResponse,
    Converter,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Group => "group",
            ResourceKind::Command => "command",
            ResourceKind::AutoResponse => "autoresponse",
            ResourceKind::Converter => "converter",
        }
    }

    /// Collection endpoint
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Group => "/api/groups",
            ResourceKind::Command => "/api/commands",
            ResourceKind::AutoResponse => "/api/autoresponses",
            ResourceKind::Converter => "/api/xray_converters",
        }
    }

    /// Query parameter that carries the key on DELETE
    pub fn key_param(&self) -> &'static str {
        match self {
            ResourceKind::Group => "jid",
            ResourceKind::Command => "command",
            ResourceKind::AutoResponse => "keyword",
            ResourceKind::Converter => "command",
        }
    }

    /// Label used in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Group => "group",
            ResourceKind::Command => "command",
            ResourceKind::AutoResponse => "auto response",
            ResourceKind::Converter => "converter",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================
// RECORDS
// ============================================

/// A chat group the bot is allowed to serve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub id: i64,
    pub group_jid: String,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A trigger token (e.g. `.ping`) and what the bot answers with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(default)]
    pub id: i64,
    pub command: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub response_type: CommandVariant,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub media_file_path: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A keyword the bot reacts to without an explicit command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoResponse {
    #[serde(default)]
    pub id: i64,
    pub keyword: String,
    #[serde(default)]
    pub response_type: AutoResponseVariant,
    #[serde(default)]
    pub text_response: Option<String>,
    #[serde(default)]
    pub sticker_path: Option<String>,
    #[serde(default)]
    pub audio_path: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A command that rewrites XRay share links onto a bug host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Converter {
    #[serde(default)]
    pub id: i64,
    pub command_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bug_host: String,
    #[serde(default)]
    pub modify_type: ModifyType,
    #[serde(default)]
    pub server_template: String,
    #[serde(default)]
    pub host_template: String,
    #[serde(default)]
    pub sni_template: String,
    #[serde(default)]
    pub path_template: String,
    #[serde(default)]
    pub grpc_service_name: String,
    #[serde(default)]
    pub port_override: Option<u16>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A word that gets messages removed in one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForbiddenWord {
    pub id: i64,
    pub group_jid: String,
    pub word: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A chat group the bot account is currently a member of
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedGroup {
    pub jid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub participant_count: u32,
}

/// Any record of the managed collections
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Group(Group),
    Command(Command),
    AutoResponse(AutoResponse),
    Converter(Converter),
}

impl Record {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Record::Group(_) => ResourceKind::Group,
            Record::Command(_) => ResourceKind::Command,
            Record::AutoResponse(_) => ResourceKind::AutoResponse,
            Record::Converter(_) => ResourceKind::Converter,
        }
    }

    /// Natural key used to address update and delete
    pub fn key(&self) -> &str {
        match self {
            Record::Group(g) => &g.group_jid,
            Record::Command(c) => &c.command,
            Record::AutoResponse(r) => &r.keyword,
            Record::Converter(c) => &c.command_name,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Record::Group(g) => g.is_active,
            Record::Command(c) => c.is_active,
            Record::AutoResponse(r) => r.is_active,
            Record::Converter(c) => c.is_active,
        }
    }

    pub(crate) fn set_active(&mut self, value: bool) {
        match self {
            Record::Group(g) => g.is_active = value,
            Record::Command(c) => c.is_active = value,
            Record::AutoResponse(r) => r.is_active = value,
            Record::Converter(c) => c.is_active = value,
        }
    }
}

impl From<Group> for Record {
    fn from(group: Group) -> Self {
        Record::Group(group)
    }
}

impl From<Command> for Record {
    fn from(command: Command) -> Self {
        Record::Command(command)
    }
}

impl From<AutoResponse> for Record {
    fn from(response: AutoResponse) -> Self {
        Record::AutoResponse(response)
    }
}

impl From<Converter> for Record {
    fn from(converter: Converter) -> Self {
        Record::Converter(converter)
    }
}

// ============================================
// PAYLOADS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupPayload {
    pub group_jid: String,
    pub group_name: String,
    pub is_active: bool,
    pub description: String,
    pub created_by: String,
}

impl From<&Group> for GroupPayload {
    fn from(group: &Group) -> Self {
        Self {
            group_jid: group.group_jid.clone(),
            group_name: group.group_name.clone(),
            is_active: group.is_active,
            description: group.description.clone(),
            created_by: group.created_by.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandPayload {
    /// Key of the record being edited; differs from `command` on rename
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_command: Option<String>,
    pub command: String,
    pub title: String,
    pub description: String,
    pub response_type: CommandVariant,
    pub category: String,
    pub caption: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    /// Omitted on edit to keep the stored media
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoResponsePayload {
    pub keyword: String,
    pub response_type: AutoResponseVariant,
    pub text_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
    pub is_active: bool,
}

/// Converter body. The server fills `is_active` and `created_by` on create.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConverterPayload {
    pub command_name: String,
    pub display_name: String,
    pub bug_host: String,
    pub modify_type: ModifyType,
    pub server_template: String,
    pub host_template: String,
    pub sni_template: String,
    pub path_template: String,
    pub grpc_service_name: String,
    pub port_override: Option<u16>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForbiddenWordPayload {
    pub group_jid: String,
    pub word: String,
    pub created_by: String,
}

/// Body of a create or update request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Group(GroupPayload),
    Command(CommandPayload),
    AutoResponse(AutoResponsePayload),
    Converter(ConverterPayload),
}

impl Payload {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Payload::Group(_) => ResourceKind::Group,
            Payload::Command(_) => ResourceKind::Command,
            Payload::AutoResponse(_) => ResourceKind::AutoResponse,
            Payload::Converter(_) => ResourceKind::Converter,
        }
    }

    /// Key the record will have once the request succeeds
    pub fn key(&self) -> &str {
        match self {
            Payload::Group(g) => &g.group_jid,
            Payload::Command(c) => &c.command,
            Payload::AutoResponse(r) => &r.keyword,
            Payload::Converter(c) => &c.command_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_go_command_record() {
        let json = r#"{
            "id": 3,
            "command": ".listbugs",
            "title": "Bug list",
            "description": "",
            "response_type": "image",
            "text_content": null,
            "media_file_path": "media/images/20240501_101500_bugs.png",
            "caption": "Known bugs",
            "category": "tools",
            "is_active": true,
            "usage_count": 12,
            "created_by": "admin",
            "created_at": "2024-05-01T10:15:00.123456+07:00",
            "updated_at": "0001-01-01T00:00:00Z"
        }"#;
        let command: Command = serde_json::from_str(json).unwrap();
        assert_eq!(command.response_type, CommandVariant::Image);
        assert_eq!(command.usage_count, 12);
        assert!(command.text_content.is_none());
        assert_eq!(
            command.media_file_path.as_deref(),
            Some("media/images/20240501_101500_bugs.png")
        );
    }

    #[test]
    fn test_command_payload_omits_absent_media() {
        let payload = Payload::Command(CommandPayload {
            original_command: None,
            command: ".ping".into(),
            title: "Ping".into(),
            description: String::new(),
            response_type: CommandVariant::Text,
            category: "tools".into(),
            caption: None,
            is_active: true,
            text_content: Some("pong".into()),
            media_file_path: None,
        });
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["text_content"], "pong");
        assert!(value.get("media_file_path").is_none());
        assert!(value.get("original_command").is_none());
        assert!(value.get("usage_count").is_none());
        assert!(value["caption"].is_null());
    }

    #[test]
    fn test_parse_go_converter_record() {
        let json = r#"{
            "id": 1,
            "command_name": ".xlvidio",
            "display_name": "XL Vidio",
            "bug_host": "quiz.vidio.com",
            "modify_type": "wildcard",
            "server_template": "",
            "host_template": "",
            "sni_template": "",
            "path_template": "",
            "grpc_service_name": "",
            "port_override": null,
            "is_active": true,
            "usage_count": 5,
            "created_by": "admin",
            "created_at": "2024-05-01T10:15:00Z",
            "updated_at": "2024-05-01T10:15:00Z"
        }"#;
        let record = Record::from(serde_json::from_str::<Converter>(json).unwrap());
        assert_eq!(record.kind(), ResourceKind::Converter);
        assert_eq!(record.key(), ".xlvidio");
        match record {
            Record::Converter(c) => {
                assert_eq!(c.modify_type, ModifyType::Wildcard);
                assert!(c.port_override.is_none());
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_record_key_and_flag() {
        let mut record = Record::Group(Group {
            id: 1,
            group_jid: "123@g.us".into(),
            group_name: "Study".into(),
            is_active: false,
            description: String::new(),
            created_by: "admin".into(),
            created_at: None,
            updated_at: None,
        });
        assert_eq!(record.kind(), ResourceKind::Group);
        assert_eq!(record.key(), "123@g.us");
        record.set_active(true);
        assert!(record.is_active());
    }
}
