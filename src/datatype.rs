//! Column datatype labels shared by inference and configuration.

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Datatype {
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "date-time")]
    DateTime,
    #[serde(rename = "string")]
    String,
}

impl Datatype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::Integer => "integer",
            Datatype::Number => "number",
            Datatype::DateTime => "date-time",
            Datatype::String => "string",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["string", "integer", "number", "date-time"]
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "integer" => Ok(Datatype::Integer),
            "number" => Ok(Datatype::Number),
            "date-time" => Ok(Datatype::DateTime),
            "string" => Ok(Datatype::String),
            _ => Err(anyhow!(
                "Unknown datatype '{value}'. Supported types: {}",
                Datatype::variants().join(", ")
            )),
        }
    }
}
