//! Per-server system settings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::field::Field;
use super::rules::{max_chars, truthy, verify_fields, web_url, FieldRule};
use crate::errors::PluralKitResult;

/// System settings for one Discord server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemGuildSettings {
    /// Discord server ID.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub guild: Field<String>,
    /// Whether proxying is enabled in this server.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub proxying_enabled: Field<bool>,
    /// Server-specific system tag.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub tag: Field<String>,
    /// Whether the tag is shown in this server.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub tag_enabled: Field<bool>,
    /// Server-specific avatar URL.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub avatar_url: Field<String>,
    /// Server-specific display name.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub display_name: Field<String>,
}

const GUILD_SETTINGS_RULES: &[FieldRule] = &[
    FieldRule::any("guild"),
    FieldRule {
        name: "proxying_enabled",
        check: truthy,
        message: "",
    },
    FieldRule {
        name: "tag",
        check: tag_length,
        message: "Server tag must be 79 characters or less",
    },
    FieldRule {
        name: "tag_enabled",
        check: truthy,
        message: "",
    },
    FieldRule {
        name: "avatar_url",
        check: web_url,
        message: "Avatar URL must be a valid http or https URL",
    },
    FieldRule {
        name: "display_name",
        check: display_name_length,
        message: "Display name must be 100 characters or less",
    },
];

fn tag_length(value: &Value) -> Option<Value> {
    max_chars(value, 79)
}

fn display_name_length(value: &Value) -> Option<Value> {
    max_chars(value, 100)
}

impl SystemGuildSettings {
    /// Creates settings for `guild` with every other field unset.
    pub fn for_guild(guild: impl Into<String>) -> Self {
        Self {
            guild: Field::Value(guild.into()),
            ..Self::default()
        }
    }

    /// Validates the set fields and returns the body to send.
    pub fn verify(&self) -> PluralKitResult<Map<String, Value>> {
        verify_fields(self, GUILD_SETTINGS_RULES)
    }
}
