//! System records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::field::Field;
use super::rules::{hex_color, max_chars, verify_fields, web_url, FieldRule};
use super::utils::{validate_privacy, Privacy};
use crate::errors::PluralKitResult;

/// Reference that resolves to the system owning the token.
pub const SELF_REFERENCE: &str = "@me";

/// Privacy keys of a system, in the order they are sent.
pub const SYSTEM_PRIVACY_KEYS: &[&str] = &[
    "description_privacy",
    "pronoun_privacy",
    "member_list_privacy",
    "group_list_privacy",
    "front_privacy",
    "front_history_privacy",
];

/// A PluralKit system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct System {
    /// Five or six letter short ID.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub id: Field<String>,
    /// Stable UUID.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub uuid: Field<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub name: Field<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub description: Field<String>,
    /// Tag appended to proxied messages.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub tag: Field<String>,
    /// Pronouns.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub pronouns: Field<String>,
    /// Avatar image URL.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub avatar_url: Field<String>,
    /// Banner image URL.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub banner: Field<String>,
    /// Hex colour, without `#`.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub color: Field<String>,
    /// Creation time.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub created: Field<DateTime<Utc>>,
    /// Privacy settings.
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub privacy: Field<SystemPrivacy>,
}

/// Privacy settings of a system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPrivacy {
    /// Visibility of the description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_privacy: Option<Privacy>,
    /// Visibility of the pronouns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronoun_privacy: Option<Privacy>,
    /// Visibility of the member list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_list_privacy: Option<Privacy>,
    /// Visibility of the group list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_list_privacy: Option<Privacy>,
    /// Visibility of current fronters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_privacy: Option<Privacy>,
    /// Visibility of the switch history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_history_privacy: Option<Privacy>,
}

const SYSTEM_RULES: &[FieldRule] = &[
    FieldRule::any("id"),
    FieldRule::any("uuid"),
    FieldRule {
        name: "name",
        check: name_length,
        message: "Name must be 100 characters or less",
    },
    FieldRule {
        name: "description",
        check: description_length,
        message: "Description must be 1000 characters or less",
    },
    FieldRule::any("tag"),
    FieldRule::any("pronouns"),
    FieldRule {
        name: "avatar_url",
        check: web_url,
        message: "Avatar URL must be a valid http or https URL",
    },
    FieldRule {
        name: "banner",
        check: web_url,
        message: "Banner URL must be a valid http or https URL",
    },
    FieldRule {
        name: "color",
        check: hex_color,
        message: "Color must be a valid hex code",
    },
    FieldRule::any("created"),
    FieldRule {
        name: "privacy",
        check: system_privacy,
        message: "Privacy must be an object",
    },
];

fn name_length(value: &Value) -> Option<Value> {
    max_chars(value, 100)
}

fn description_length(value: &Value) -> Option<Value> {
    max_chars(value, 999)
}

fn system_privacy(value: &Value) -> Option<Value> {
    let privacy: &Map<String, Value> = value.as_object()?;
    Some(Value::Object(validate_privacy(SYSTEM_PRIVACY_KEYS, privacy)))
}

impl System {
    /// Creates an empty system record with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the set fields and returns the body to send.
    ///
    /// Unset fields are omitted and null fields are kept. The colour is
    /// normalised to lowercase hex without `#`. On failure every broken
    /// rule is reported, one message per line.
    pub fn verify(&self) -> PluralKitResult<Map<String, Value>> {
        verify_fields(self, SYSTEM_RULES)
    }

    /// The reference to use in a request path: the ID, or
    /// [`SELF_REFERENCE`].
    pub fn reference(&self) -> &str {
        match &self.id {
            Field::Value(id) if !id.is_empty() => id,
            _ => SELF_REFERENCE,
        }
    }
}
