//! Form-to-record mapping
//!
//! Each form holds the raw values a user typed plus the selected response
//! variant. `build` validates them and produces a [`Submission`]: the payload
//! to send and, when media is involved, the upload that has to succeed first.

use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::model::{
    AutoResponse, AutoResponsePayload, AutoResponseVariant, Command, CommandPayload,
    CommandVariant, Converter, ConverterPayload, ForbiddenWordPayload, GroupPayload, ModifyType,
    Payload, UploadCategory,
};
use crate::upload::FileSelection;

/// Whether a submission creates a record or replaces an existing one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitMode {
    #[default]
    Create,
    Update,
}

impl SubmitMode {
    pub fn verb(&self) -> &'static str {
        match self {
            SubmitMode::Create => "add",
            SubmitMode::Update => "update",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            SubmitMode::Create => "added",
            SubmitMode::Update => "updated",
        }
    }
}

/// Payload field that receives the stored path of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    CommandMedia,
    Sticker,
    Audio,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub file: FileSelection,
    pub category: UploadCategory,
    pub slot: MediaSlot,
}

/// A validated payload, possibly waiting on an upload
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub mode: SubmitMode,
    pub payload: Payload,
    pub upload: Option<PendingUpload>,
}

impl Submission {
    /// Fill the media slot with the path the server returned
    pub fn attach_media(&mut self, slot: MediaSlot, path: String) {
        match (&mut self.payload, slot) {
            (Payload::Command(command), MediaSlot::CommandMedia) => {
                command.media_file_path = Some(path);
            }
            (Payload::AutoResponse(response), MediaSlot::Sticker) => {
                response.sticker_path = Some(path);
            }
            (Payload::AutoResponse(response), MediaSlot::Audio) => {
                response.audio_path = Some(path);
            }
            (payload, slot) => {
                debug!("Ignoring {:?} media for a {} payload", slot, payload.kind());
            }
        }
    }
}

// ============================================
// FORMS
// ============================================

/// Register a chat group with the bot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupForm {
    pub group_jid: String,
    pub group_name: String,
    pub description: String,
    pub is_active: bool,
    pub created_by: String,
}

impl GroupForm {
    pub fn build(self) -> Result<Submission, ValidationError> {
        let group_jid = required(&self.group_jid, "group JID")?;
        let group_name = required(&self.group_name, "group name")?;

        Ok(Submission {
            mode: SubmitMode::Create,
            payload: Payload::Group(GroupPayload {
                group_jid,
                group_name,
                is_active: self.is_active,
                description: self.description.trim().to_string(),
                created_by: self.created_by,
            }),
            upload: None,
        })
    }
}

/// Create or edit a command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandForm {
    /// Key of the record being edited; `None` for a new command
    pub original_command: Option<String>,
    pub command: String,
    pub title: String,
    pub description: String,
    pub variant: CommandVariant,
    pub category: String,
    pub caption: String,
    pub text_content: String,
    pub file: Option<FileSelection>,
    pub is_active: bool,
    /// Set on edit when the stored record already has media
    pub stored_media: Option<MediaSlot>,
}

impl CommandForm {
    /// Empty form for a new command
    pub fn new(command: impl Into<String>, variant: CommandVariant) -> Self {
        Self {
            command: command.into(),
            variant,
            is_active: true,
            ..Self::default()
        }
    }

    /// Edit form prefilled from the mirrored record
    pub fn edit(existing: &Command) -> Self {
        Self {
            original_command: Some(existing.command.clone()),
            command: existing.command.clone(),
            title: existing.title.clone(),
            description: existing.description.clone(),
            variant: existing.response_type,
            category: existing.category.clone(),
            caption: existing.caption.clone().unwrap_or_default(),
            text_content: existing.text_content.clone().unwrap_or_default(),
            file: None,
            is_active: existing.is_active,
            stored_media: existing
                .media_file_path
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|_| MediaSlot::CommandMedia),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.original_command.is_some()
    }

    pub fn build(self) -> Result<Submission, ValidationError> {
        let command = required(&self.command, "command")?;
        let title = required(&self.title, "title")?;
        let mode = mode_for(self.is_edit());

        let (text_content, upload) = match self.variant.upload_category() {
            None => {
                if self.file.is_some() {
                    return Err(ValidationError::UnexpectedFile(self.variant.as_str()));
                }
                let text = required_text(&self.text_content, "text content")?;
                (Some(text), None)
            }
            Some(category) => {
                let upload = media_upload(
                    self.file,
                    category,
                    MediaSlot::CommandMedia,
                    self.variant.as_str(),
                    self.stored_media.as_slice(),
                )?;
                (None, upload)
            }
        };

        Ok(Submission {
            mode,
            payload: Payload::Command(CommandPayload {
                original_command: self.original_command,
                command,
                title,
                description: self.description.trim().to_string(),
                response_type: self.variant,
                category: self.category.trim().to_string(),
                caption: optional(&self.caption),
                is_active: self.is_active,
                text_content,
                media_file_path: None,
            }),
            upload,
        })
    }
}

/// Create or edit an auto response
///
/// The keyword identifies the record on edit and cannot be changed there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoResponseForm {
    pub mode: SubmitMode,
    pub keyword: String,
    pub variant: AutoResponseVariant,
    pub text: String,
    pub file: Option<FileSelection>,
    pub is_active: bool,
    /// Media slots the stored record already has filled
    pub stored_media: Vec<MediaSlot>,
}

impl AutoResponseForm {
    pub fn new(keyword: impl Into<String>, variant: AutoResponseVariant) -> Self {
        Self {
            keyword: keyword.into(),
            variant,
            is_active: true,
            ..Self::default()
        }
    }

    pub fn edit(existing: &AutoResponse) -> Self {
        let mut stored_media = Vec::new();
        if existing.sticker_path.as_deref().is_some_and(|p| !p.is_empty()) {
            stored_media.push(MediaSlot::Sticker);
        }
        if existing.audio_path.as_deref().is_some_and(|p| !p.is_empty()) {
            stored_media.push(MediaSlot::Audio);
        }

        Self {
            mode: SubmitMode::Update,
            keyword: existing.keyword.clone(),
            variant: existing.response_type,
            text: existing.text_response.clone().unwrap_or_default(),
            file: None,
            is_active: existing.is_active,
            stored_media,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.mode == SubmitMode::Update
    }

    pub fn build(self) -> Result<Submission, ValidationError> {
        let keyword = required(&self.keyword, "keyword")?;
        let name = self.variant.as_str();

        let (text_response, upload) = match self.variant {
            AutoResponseVariant::Text => {
                if self.file.is_some() {
                    warn!("Ignoring the file selected for text response '{}'", keyword);
                }
                (optional_text(&self.text), None)
            }
            AutoResponseVariant::Sticker => {
                let upload = media_upload(
                    self.file,
                    UploadCategory::Stickers,
                    MediaSlot::Sticker,
                    name,
                    &self.stored_media,
                )?;
                (None, upload)
            }
            AutoResponseVariant::Audio => {
                let upload = media_upload(
                    self.file,
                    UploadCategory::Audios,
                    MediaSlot::Audio,
                    name,
                    &self.stored_media,
                )?;
                (None, upload)
            }
            AutoResponseVariant::Mixed => {
                let upload = self.file.map(|file| PendingUpload {
                    file,
                    category: UploadCategory::Audios,
                    slot: MediaSlot::Audio,
                });
                (optional_text(&self.text), upload)
            }
        };

        Ok(Submission {
            mode: self.mode,
            payload: Payload::AutoResponse(AutoResponsePayload {
                keyword,
                response_type: self.variant,
                text_response,
                sticker_path: None,
                audio_path: None,
                is_active: self.is_active,
            }),
            upload,
        })
    }
}

/// Add a banned word to one group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForbiddenWordForm {
    pub group_jid: String,
    pub word: String,
    pub created_by: String,
}

impl ForbiddenWordForm {
    pub fn build(self) -> Result<ForbiddenWordPayload, ValidationError> {
        Ok(ForbiddenWordPayload {
            group_jid: required(&self.group_jid, "group JID")?,
            word: required(&self.word, "word")?,
            created_by: self.created_by,
        })
    }
}

/// Create or edit an XRay link converter
///
/// Like auto responses, the command name is fixed once the converter exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConverterForm {
    pub mode: SubmitMode,
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

impl ConverterForm {
    pub fn new(command_name: impl Into<String>, modify_type: ModifyType) -> Self {
        Self {
            command_name: command_name.into(),
            modify_type,
            is_active: true,
            ..Self::default()
        }
    }

    pub fn edit(existing: &Converter) -> Self {
        Self {
            mode: SubmitMode::Update,
            command_name: existing.command_name.clone(),
            display_name: existing.display_name.clone(),
            bug_host: existing.bug_host.clone(),
            modify_type: existing.modify_type,
            server_template: existing.server_template.clone(),
            host_template: existing.host_template.clone(),
            sni_template: existing.sni_template.clone(),
            path_template: existing.path_template.clone(),
            grpc_service_name: existing.grpc_service_name.clone(),
            port_override: existing.port_override,
            is_active: existing.is_active,
        }
    }

    pub fn build(self) -> Result<Submission, ValidationError> {
        let command_name = required(&self.command_name, "command name")?;
        let display_name = required(&self.display_name, "display name")?;
        let bug_host = required(&self.bug_host, "bug host")?;

        // address templates only apply to custom converters
        let template = |value: &str| {
            if self.modify_type == ModifyType::Custom {
                value.trim().to_string()
            } else {
                String::new()
            }
        };

        Ok(Submission {
            mode: self.mode,
            payload: Payload::Converter(ConverterPayload {
                command_name,
                display_name,
                bug_host,
                modify_type: self.modify_type,
                server_template: template(&self.server_template),
                host_template: template(&self.host_template),
                sni_template: template(&self.sni_template),
                path_template: self.path_template.trim().to_string(),
                grpc_service_name: self.grpc_service_name.trim().to_string(),
                port_override: self.port_override,
                is_active: self.is_active,
            }),
            upload: None,
        })
    }
}

// ============================================
// FIELD RULES
// ============================================

fn mode_for(is_edit: bool) -> SubmitMode {
    if is_edit {
        SubmitMode::Update
    } else {
        SubmitMode::Create
    }
}

/// Keys and names: trimmed, must not be blank
fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Message bodies keep their formatting but must not be blank
fn required_text(value: &str, field: &'static str) -> Result<String, ValidationError> {
    optional_text(value).ok_or(ValidationError::MissingField(field))
}

fn optional_text(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A media variant needs a file unless its slot is already filled on the stored record
fn media_upload(
    file: Option<FileSelection>,
    category: UploadCategory,
    slot: MediaSlot,
    variant: &'static str,
    stored_media: &[MediaSlot],
) -> Result<Option<PendingUpload>, ValidationError> {
    match file {
        Some(file) => Ok(Some(PendingUpload {
            file,
            category,
            slot,
        })),
        None if stored_media.contains(&slot) => Ok(None),
        None => Err(ValidationError::MissingFile(variant)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_form(command: &str, title: &str, text: &str) -> CommandForm {
        CommandForm {
            title: title.into(),
            text_content: text.into(),
            ..CommandForm::new(command, CommandVariant::Text)
        }
    }

    #[test]
    fn test_command_requires_key() {
        let err = command_form("", "x", "").build().unwrap_err();
        assert_eq!(err, ValidationError::MissingField("command"));
    }

    #[test]
    fn test_command_requires_title() {
        let err = command_form(".ping", "  ", "pong").build().unwrap_err();
        assert_eq!(err, ValidationError::MissingField("title"));
    }

    #[test]
    fn test_text_command_builds_without_media() {
        let submission = command_form(".ping", "Ping", "pong").build().unwrap();
        assert_eq!(submission.mode, SubmitMode::Create);
        assert!(submission.upload.is_none());
        match submission.payload {
            Payload::Command(payload) => {
                assert_eq!(payload.text_content.as_deref(), Some("pong"));
                assert!(payload.media_file_path.is_none());
                assert!(payload.is_active);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_text_command_requires_content() {
        let err = command_form(".ping", "Ping", "   ").build().unwrap_err();
        assert_eq!(err, ValidationError::MissingField("text content"));
    }

    #[test]
    fn test_text_command_rejects_file() {
        let mut form = command_form(".ping", "Ping", "pong");
        form.file = Some(FileSelection::new("pong.png"));
        assert_eq!(
            form.build().unwrap_err(),
            ValidationError::UnexpectedFile("text")
        );
    }

    #[test]
    fn test_media_command_requires_file_on_create() {
        let form = CommandForm {
            title: "Bugs".into(),
            ..CommandForm::new(".listbugs", CommandVariant::Image)
        };
        assert_eq!(
            form.build().unwrap_err(),
            ValidationError::MissingFile("image")
        );
    }

    #[test]
    fn test_media_command_plans_upload() {
        let form = CommandForm {
            title: "Installer".into(),
            file: Some(FileSelection::new("/tmp/app.apk")),
            ..CommandForm::new(".apk", CommandVariant::File)
        };
        let submission = form.build().unwrap();
        let upload = submission.upload.unwrap();
        assert_eq!(upload.category, UploadCategory::Files);
        assert_eq!(upload.slot, MediaSlot::CommandMedia);
    }

    #[test]
    fn test_edit_without_file_keeps_media() {
        let existing = Command {
            id: 9,
            command: ".listbugs".into(),
            title: "Bugs".into(),
            description: String::new(),
            response_type: CommandVariant::Image,
            text_content: None,
            media_file_path: Some("media/images/bugs.png".into()),
            caption: Some("Known bugs".into()),
            category: "tools".into(),
            is_active: true,
            usage_count: 40,
            created_by: "admin".into(),
            created_at: None,
            updated_at: None,
        };
        let mut form = CommandForm::edit(&existing);
        form.command = ".bugs".into();
        form.is_active = false;

        let submission = form.build().unwrap();
        assert_eq!(submission.mode, SubmitMode::Update);
        assert!(submission.upload.is_none());
        match submission.payload {
            Payload::Command(payload) => {
                assert_eq!(payload.original_command.as_deref(), Some(".listbugs"));
                assert_eq!(payload.command, ".bugs");
                assert!(payload.media_file_path.is_none());
                assert!(!payload.is_active);
                assert_eq!(payload.caption.as_deref(), Some("Known bugs"));
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_edit_text_command_to_media_needs_file() {
        let existing = Command {
            id: 2,
            command: ".ping".into(),
            title: "Ping".into(),
            description: String::new(),
            response_type: CommandVariant::Text,
            text_content: Some("pong".into()),
            media_file_path: None,
            caption: None,
            category: "tools".into(),
            is_active: true,
            usage_count: 0,
            created_by: "admin".into(),
            created_at: None,
            updated_at: None,
        };
        let mut form = CommandForm::edit(&existing);
        assert_eq!(form.stored_media, None);
        form.variant = CommandVariant::Image;
        assert_eq!(
            form.build().unwrap_err(),
            ValidationError::MissingFile("image")
        );

        let mut form = CommandForm::edit(&existing);
        form.variant = CommandVariant::Image;
        form.file = Some(FileSelection::new("/tmp/ping.png"));
        assert!(form.build().unwrap().upload.is_some());
    }

    #[test]
    fn test_sticker_response_requires_file() {
        let form = AutoResponseForm::new("lol", AutoResponseVariant::Sticker);
        assert_eq!(
            form.build().unwrap_err(),
            ValidationError::MissingFile("sticker")
        );
    }

    #[test]
    fn test_mixed_response_accepts_text_only() {
        let form = AutoResponseForm {
            text: "hello".into(),
            ..AutoResponseForm::new("hi", AutoResponseVariant::Mixed)
        };
        let submission = form.build().unwrap();
        assert!(submission.upload.is_none());
        match submission.payload {
            Payload::AutoResponse(payload) => {
                assert_eq!(payload.text_response.as_deref(), Some("hello"));
                assert!(payload.sticker_path.is_none());
                assert!(payload.audio_path.is_none());
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_text_response_needs_only_keyword() {
        let submission = AutoResponseForm::new("hi", AutoResponseVariant::Text)
            .build()
            .unwrap();
        match submission.payload {
            Payload::AutoResponse(payload) => {
                assert_eq!(payload.keyword, "hi");
                assert!(payload.text_response.is_none());
            }
            other => panic!("unexpected payload {:?}", other),
        }

        let err = AutoResponseForm::new("  ", AutoResponseVariant::Text)
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("keyword"));
    }

    #[test]
    fn test_text_response_ignores_selected_file() {
        let form = AutoResponseForm {
            text: "hello".into(),
            file: Some(FileSelection::new("/tmp/hello.ogg")),
            ..AutoResponseForm::new("hi", AutoResponseVariant::Text)
        };
        let submission = form.build().unwrap();
        assert!(submission.upload.is_none());
    }

    #[test]
    fn test_mixed_response_may_be_empty() {
        let submission = AutoResponseForm::new("hi", AutoResponseVariant::Mixed)
            .build()
            .unwrap();
        assert!(submission.upload.is_none());
    }

    fn stored_response(variant: AutoResponseVariant, sticker: Option<&str>) -> AutoResponse {
        AutoResponse {
            id: 3,
            keyword: "lol".into(),
            response_type: variant,
            text_response: sticker.is_none().then(|| "haha".to_string()),
            sticker_path: sticker.map(str::to_string),
            audio_path: None,
            is_active: true,
            usage_count: 0,
            created_by: "admin".into(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_edit_keeps_keyword_and_sends_no_original() {
        let existing = stored_response(AutoResponseVariant::Text, None);
        let mut form = AutoResponseForm::edit(&existing);
        form.text = "hehe".into();

        let submission = form.build().unwrap();
        assert_eq!(submission.mode, SubmitMode::Update);
        assert_eq!(submission.payload.key(), "lol");
        let json = serde_json::to_value(&submission.payload).unwrap();
        assert!(json.get("original_keyword").is_none());
    }

    #[test]
    fn test_edit_to_sticker_needs_file_unless_stored() {
        let text = stored_response(AutoResponseVariant::Text, None);
        let mut form = AutoResponseForm::edit(&text);
        form.variant = AutoResponseVariant::Sticker;
        assert_eq!(
            form.build().unwrap_err(),
            ValidationError::MissingFile("sticker")
        );

        let sticker = stored_response(AutoResponseVariant::Sticker, Some("media/stickers/lol.webp"));
        let submission = AutoResponseForm::edit(&sticker).build().unwrap();
        assert!(submission.upload.is_none());

        // the stored sticker does not satisfy an audio response
        let mut form = AutoResponseForm::edit(&sticker);
        form.variant = AutoResponseVariant::Audio;
        assert_eq!(form.build().unwrap_err(), ValidationError::MissingFile("audio"));
    }

    #[test]
    fn test_audio_response_drops_stale_text() {
        let form = AutoResponseForm {
            text: "left over from a text response".into(),
            file: Some(FileSelection::new("/tmp/gabut.ogg")),
            ..AutoResponseForm::new("gabut", AutoResponseVariant::Audio)
        };
        let submission = form.build().unwrap();
        assert_eq!(
            submission.upload.as_ref().map(|u| (u.category, u.slot)),
            Some((UploadCategory::Audios, MediaSlot::Audio))
        );
        match submission.payload {
            Payload::AutoResponse(payload) => assert!(payload.text_response.is_none()),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_attach_media_fills_slot() {
        let form = AutoResponseForm {
            file: Some(FileSelection::new("/tmp/lol.webp")),
            ..AutoResponseForm::new("lol", AutoResponseVariant::Sticker)
        };
        let mut submission = form.build().unwrap();
        let slot = submission.upload.as_ref().unwrap().slot;
        submission.attach_media(slot, "media/stickers/lol.webp".into());
        match submission.payload {
            Payload::AutoResponse(payload) => {
                assert_eq!(payload.sticker_path.as_deref(), Some("media/stickers/lol.webp"));
                assert!(payload.audio_path.is_none());
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_converter_clears_templates_unless_custom() {
        let form = ConverterForm {
            display_name: "XL Vidio".into(),
            bug_host: "quiz.vidio.com".into(),
            server_template: "{bug}".into(),
            path_template: "/vmess".into(),
            port_override: Some(443),
            ..ConverterForm::new(".xlvidio", ModifyType::Wildcard)
        };
        let submission = form.clone().build().unwrap();
        match submission.payload {
            Payload::Converter(payload) => {
                assert!(payload.server_template.is_empty());
                assert_eq!(payload.path_template, "/vmess");
                assert_eq!(payload.port_override, Some(443));
            }
            other => panic!("unexpected payload {:?}", other),
        }

        let custom = ConverterForm {
            modify_type: ModifyType::Custom,
            ..form
        };
        match custom.build().unwrap().payload {
            Payload::Converter(payload) => assert_eq!(payload.server_template, "{bug}"),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_converter_requires_bug_host() {
        let form = ConverterForm {
            display_name: "XL Vidio".into(),
            ..ConverterForm::new(".xlvidio", ModifyType::Sni)
        };
        assert_eq!(
            form.build().unwrap_err(),
            ValidationError::MissingField("bug host")
        );
    }

    #[test]
    fn test_group_and_word_forms() {
        let err = GroupForm {
            group_jid: "120363@g.us".into(),
            ..GroupForm::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("group name"));

        let err = ForbiddenWordForm {
            group_jid: "120363@g.us".into(),
            word: " ".into(),
            created_by: "admin".into(),
        }
        .build()
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("word"));
    }
}
