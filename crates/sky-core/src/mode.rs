use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operator policy deciding whether remediation runs unattended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingMode {
    #[serde(rename = "AUTO")]
    Auto,
    #[serde(rename = "CO-PILOT")]
    CoPilot,
    #[serde(rename = "MANUAL")]
    Manual,
}

impl OperatingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::CoPilot => "CO-PILOT",
            Self::Manual => "MANUAL",
        }
    }

    /// Manual mode keeps operator-curated options across status flickers.
    pub fn retains_options(self) -> bool {
        matches!(self, Self::Manual)
    }
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self::Auto
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatingMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "co-pilot" | "copilot" | "co_pilot" => Ok(Self::CoPilot),
            "manual" => Ok(Self::Manual),
            _ => Err(()),
        }
    }
}
