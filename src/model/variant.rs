//! Response-type variants and the upload buckets they map to

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Server-side storage bucket for an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadCategory {
    Images,
    Videos,
    Audios,
    Stickers,
    Files,
}

impl UploadCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadCategory::Images => "images",
            UploadCategory::Videos => "videos",
            UploadCategory::Audios => "audios",
            UploadCategory::Stickers => "stickers",
            UploadCategory::Files => "files",
        }
    }

    /// Map a raw response-type name to its bucket.
    /// Unknown names land in `files`.
    pub fn for_response_type(response_type: &str) -> Self {
        match response_type {
            "image" => UploadCategory::Images,
            "video" => UploadCategory::Videos,
            "audio" => UploadCategory::Audios,
            "sticker" => UploadCategory::Stickers,
            _ => UploadCategory::Files,
        }
    }
}

/// How a command answers when it is triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommandVariant {
    #[default]
    Text,
    Image,
    Video,
    Audio,
    Sticker,
    File,
}

impl CommandVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandVariant::Text => "text",
            CommandVariant::Image => "image",
            CommandVariant::Video => "video",
            CommandVariant::Audio => "audio",
            CommandVariant::Sticker => "sticker",
            CommandVariant::File => "file",
        }
    }

    /// Bucket for the media file, or `None` for inline text
    pub fn upload_category(&self) -> Option<UploadCategory> {
        match self {
            CommandVariant::Text => None,
            media => Some(UploadCategory::for_response_type(media.as_str())),
        }
    }
}

/// How an auto response answers a matched keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AutoResponseVariant {
    #[default]
    Text,
    Sticker,
    Audio,
    Mixed,
}

impl AutoResponseVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoResponseVariant::Text => "text",
            AutoResponseVariant::Sticker => "sticker",
            AutoResponseVariant::Audio => "audio",
            AutoResponseVariant::Mixed => "mixed",
        }
    }

    /// Bucket for an attached file. Mixed responses carry their media as audio.
    pub fn upload_category(&self) -> Option<UploadCategory> {
        match self {
            AutoResponseVariant::Text => None,
            AutoResponseVariant::Sticker => Some(UploadCategory::Stickers),
            AutoResponseVariant::Audio | AutoResponseVariant::Mixed => Some(UploadCategory::Audios),
        }
    }
}

/// How an XRay converter rewrites the addresses of a shared link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModifyType {
    #[default]
    Wildcard,
    Sni,
    Ws,
    Grpc,
    Custom,
}

impl ModifyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModifyType::Wildcard => "wildcard",
            ModifyType::Sni => "sni",
            ModifyType::Ws => "ws",
            ModifyType::Grpc => "grpc",
            ModifyType::Custom => "custom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_variant_categories() {
        assert_eq!(CommandVariant::Text.upload_category(), None);
        assert_eq!(CommandVariant::Image.upload_category(), Some(UploadCategory::Images));
        assert_eq!(CommandVariant::Video.upload_category(), Some(UploadCategory::Videos));
        assert_eq!(CommandVariant::Audio.upload_category(), Some(UploadCategory::Audios));
        assert_eq!(CommandVariant::Sticker.upload_category(), Some(UploadCategory::Stickers));
        assert_eq!(CommandVariant::File.upload_category(), Some(UploadCategory::Files));
    }

    #[test]
    fn test_unknown_response_type_defaults_to_files() {
        assert_eq!(UploadCategory::for_response_type("document"), UploadCategory::Files);
        assert_eq!(UploadCategory::for_response_type(""), UploadCategory::Files);
    }

    #[test]
    fn test_variant_wire_names() {
        let json = serde_json::to_string(&AutoResponseVariant::Mixed).unwrap();
        assert_eq!(json, "\"mixed\"");
        let variant: CommandVariant = serde_json::from_str("\"sticker\"").unwrap();
        assert_eq!(variant, CommandVariant::Sticker);
    }
}
