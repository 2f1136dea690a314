use serde::{Deserialize, Serialize};

use crate::chat::sanitize::{lenient_float, lenient_int};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: i64,
    pub name: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: i64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub n: i64,
    pub system_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetSummary {
    pub id: i64,
    pub name: String,
}

/// Writable preset fields. Anything left out is bound as NULL and rejected
/// by the table's NOT NULL constraints.
///
/// Numeric fields take JSON numbers or numeric strings, parsed the same way
/// as chat parameters. An unparseable float is stored as NaN; an unparseable
/// integer is left unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetFields {
    pub name: Option<String>,
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub max_tokens: Option<i64>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub top_p: Option<f64>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub presence_penalty: Option<f64>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub n: Option<i64>,
    #[serde(alias = "systemMessage")]
    pub system_message: Option<String>,
}
