//! Helpers shared by the record types.

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Visibility of a privacy-controlled field.
///
/// Deserializes from `"public"`/`"private"` or from a boolean, `true`
/// meaning public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    /// Visible to everyone.
    Public,
    /// Visible only to the system itself.
    Private,
}

impl From<bool> for Privacy {
    fn from(public: bool) -> Self {
        if public {
            Privacy::Public
        } else {
            Privacy::Private
        }
    }
}

impl<'de> Deserialize<'de> for Privacy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Named(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(public) => Ok(Privacy::from(public)),
            Repr::Named(name) => match name.as_str() {
                "public" => Ok(Privacy::Public),
                "private" => Ok(Privacy::Private),
                other => Err(D::Error::custom(format!(
                    "invalid privacy value {other:?}, expected public or private"
                ))),
            },
        }
    }
}

/// Normalises the privacy settings in `privacy` for the given `keys`.
///
/// Keys missing from `privacy` are skipped, as are keys not listed in
/// `keys`. `true` becomes `"public"` and `false` becomes `"private"`;
/// every other value is kept as is.
pub fn validate_privacy(keys: &[&str], privacy: &Map<String, Value>) -> Map<String, Value> {
    let mut normalised = Map::new();

    for key in keys {
        let Some(value) = privacy.get(*key) else {
            continue;
        };
        let value = match value {
            Value::Bool(true) => Value::from("public"),
            Value::Bool(false) => Value::from("private"),
            other => other.clone(),
        };
        normalised.insert((*key).to_string(), value);
    }

    normalised
}

/// Formats a date as `YYYY-MM-DD`, zero-padding the year to four digits.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
