//! API flavor selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which backend API family serves a request.
///
/// The flavor is the key of the binding cache: every flavor resolves to at
/// most one backend adapter per cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiFlavor {
    /// Orchestration service (templating, filtering and model routing in front
    /// of the model).
    #[default]
    Orchestration,
    /// Direct calls to a deployed model.
    #[serde(alias = "foundation-models")]
    DirectModel,
}

impl ApiFlavor {
    /// All known flavors.
    pub const ALL: [ApiFlavor; 2] = [ApiFlavor::Orchestration, ApiFlavor::DirectModel];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ApiFlavor::Orchestration => "orchestration",
            ApiFlavor::DirectModel => "direct-model",
        }
    }
}

impl fmt::Display for ApiFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orchestration" => Ok(ApiFlavor::Orchestration),
            "direct-model" | "direct_model" | "foundation-models" => Ok(ApiFlavor::DirectModel),
            other => Err(format!("Unknown API flavor: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!(
            "orchestration".parse::<ApiFlavor>().unwrap(),
            ApiFlavor::Orchestration
        );
        assert_eq!(
            "Foundation-Models".parse::<ApiFlavor>().unwrap(),
            ApiFlavor::DirectModel
        );
        assert!("grpc".parse::<ApiFlavor>().is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&ApiFlavor::DirectModel).unwrap();
        assert_eq!(json, "\"direct-model\"");
        let back: ApiFlavor = serde_json::from_str("\"foundation-models\"").unwrap();
        assert_eq!(back, ApiFlavor::DirectModel);
    }
}
