//! Model value object representing a hosted completion model

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Completion models offered by the hosted API (Value Object)
///
/// Unknown identifiers are kept verbatim as [`Model::Custom`] so a newer
/// upstream model can be selected without a client release.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    Mixtral8x7b,
    Llama3_70b,
    Llama3_8b,
    Llama2_70b,
    Gemma7b,
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Mixtral8x7b => "mixtral-8x7b-32768",
            Model::Llama3_70b => "llama3-70b-8192",
            Model::Llama3_8b => "llama3-8b-8192",
            Model::Llama2_70b => "llama2-70b-4096",
            Model::Gemma7b => "gemma-7b-it",
            Model::Custom(s) => s,
        }
    }

    /// Models listed in the model picker
    pub fn known_models() -> Vec<Model> {
        vec![
            Model::Mixtral8x7b,
            Model::Llama3_70b,
            Model::Llama3_8b,
            Model::Llama2_70b,
            Model::Gemma7b,
        ]
    }

    /// Human-readable label for pickers
    pub fn label(&self) -> &str {
        match self {
            Model::Mixtral8x7b => "Mixtral 8x7B",
            Model::Llama3_70b => "Llama 3 70B",
            Model::Llama3_8b => "Llama 3 8B",
            Model::Llama2_70b => "Llama 2 70B",
            Model::Gemma7b => "Gemma 7B",
            Model::Custom(s) => s,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Model::Custom(_))
    }
}

impl Default for Model {
    /// Returns the default model (Mixtral 8x7B)
    fn default() -> Self {
        Model::Mixtral8x7b
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s {
            "" => return Err(DomainError::InvalidModel(s.to_string())),
            "mixtral-8x7b-32768" => Model::Mixtral8x7b,
            "llama3-70b-8192" => Model::Llama3_70b,
            "llama3-8b-8192" => Model::Llama3_8b,
            "llama2-70b-4096" => Model::Llama2_70b,
            "gemma-7b-it" => Model::Gemma7b,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
