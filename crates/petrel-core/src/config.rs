use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Carrier routing suffix appended to the account by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Isp {
    /// Campus-only account, no upstream carrier.
    Campus,
    Cmcc,
    Unicom,
    Telecom,
}

impl Isp {
    /// The suffix the portal expects in the `ISP_select` control.
    pub fn suffix(&self) -> &'static str {
        match self {
            Isp::Campus => "",
            Isp::Cmcc => "@cmcc",
            Isp::Unicom => "@unicom",
            Isp::Telecom => "@telecom",
        }
    }

    pub fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "" => Some(Isp::Campus),
            "@cmcc" => Some(Isp::Cmcc),
            "@unicom" => Some(Isp::Unicom),
            "@telecom" => Some(Isp::Telecom),
            _ => None,
        }
    }

    /// Map the interactive menu choice (1-4) to a carrier.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Isp::Campus),
            "2" => Some(Isp::Cmcc),
            "3" => Some(Isp::Unicom),
            "4" => Some(Isp::Telecom),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Isp::Campus => "campus only",
            Isp::Cmcc => "China Mobile",
            Isp::Unicom => "China Unicom",
            Isp::Telecom => "China Telecom",
        }
    }
}

impl TryFrom<String> for Isp {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Isp::from_suffix(&value).ok_or_else(|| format!("unknown ISP suffix: {value:?}"))
    }
}

impl From<Isp> for String {
    fn from(isp: Isp) -> Self {
        isp.suffix().to_string()
    }
}

/// Portal credentials, persisted in plain text by design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub isp: Isp,
}

/// Loads and saves credentials as a JSON document on disk.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location: `~/.petrel/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".petrel").join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read persisted credentials. An absent or malformed file is treated
    /// as "not configured" rather than an error.
    pub fn load(&self) -> Option<Credentials> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("No config at {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(creds) => Some(creds),
            Err(e) => {
                tracing::warn!(
                    "Config file {} is malformed ({}), credentials will be re-collected",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    pub fn save(&self, creds: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(creds)?;
        fs::write(&self.path, json)?;
        tracing::info!("Credentials saved to {}", self.path.display());
        Ok(())
    }
}
