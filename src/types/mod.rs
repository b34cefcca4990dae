//! Type definitions for the PluralKit API.
//!
//! Records use [`Field`] so that a missing key and an explicit `null` stay
//! distinct when a record is sent back with `PATCH`.

pub mod field;
pub mod guild_settings;
pub mod rules;
pub mod system;
pub mod utils;

pub use field::Field;
pub use guild_settings::SystemGuildSettings;
pub use rules::{verify_fields, FieldRule};
pub use system::{System, SystemPrivacy, SELF_REFERENCE, SYSTEM_PRIVACY_KEYS};
pub use utils::{format_date, validate_privacy, Privacy};
