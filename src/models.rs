use serde::{Deserialize, Deserializer, Serialize, de};

use crate::password::PasswordOptions;

fn default_true() -> bool {
    true
}

// Query-string boolean: true/false, 1/0, yes/no, on/off, t/f, y/n (any case)
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
        _ => Err(de::Error::custom(format!("invalid boolean: {raw}"))),
    }
}

// GET /generate query string
#[derive(Deserialize, Debug, Clone)]
pub struct GenerateParams {
    pub length: usize,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub lowercase: bool,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub uppercase: bool,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub numbers: bool,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub special: bool,
}

impl From<&GenerateParams> for PasswordOptions {
    fn from(params: &GenerateParams) -> Self {
        Self {
            length: params.length,
            lowercase: params.lowercase,
            uppercase: params.uppercase,
            numbers: params.numbers,
            special: params.special,
        }
    }
}

#[derive(Deserialize, Serialize, Clone)]
pub struct GenerateResponse {
    pub password: String,
}

// GET /check-update response
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct UpdateResponse {
    pub update: bool,
    pub latest_version: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub download_url: Option<String>,
}
