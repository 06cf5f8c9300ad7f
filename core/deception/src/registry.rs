// Path and File Name : /home/decepticloud/core/deception/src/registry.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Honeypot asset registry - loads asset definitions from YAML, validates schema, enforces fail-closed rules (exactly one asset per kind)

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{info, debug};

use crate::asset::AssetKind;
use crate::errors::DeceptionError;
use crate::signals::RecordFormat;

pub const ASSET_CONFIG_ENV: &str = "DECEPTICLOUD_ASSET_CONFIG";

const DEFAULT_SSH_ASSET_ID: &str = "cowrie_honeypot";
const DEFAULT_SSH_LOG_PATH: &str = "/home/ubuntu/cowrie/var/log/cowrie/cowrie.json";
const DEFAULT_WEB_ASSET_ID: &str = "web_honeypot";
const DEFAULT_WEB_LOG_PATH: &str = "/var/log/decepticloud/web_honeypot.log";

const COWRIE_ATTACK_MARKERS: &[&str] = &[
    "cowrie.session.connect",
    "cowrie.login.",
    "cowrie.command.",
];

const SSH_TEXT_ATTACK_MARKERS: &[&str] = &["Connection from", "Login attempt"];

const WEB_TEXT_ATTACK_MARKERS: &[&str] = &[
    "Web access from",
    "Login attempt from",
    "Path access from",
];

/// One deception asset as declared in the registry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDefinition {
    /// Identifier understood by the lifecycle runtime (container name).
    pub asset_id: String,
    pub kind: AssetKind,
    /// Attack signal source for this asset.
    pub log_path: PathBuf,
    #[serde(default)]
    pub log_format: Option<RecordFormat>,
    #[serde(default)]
    pub attack_markers: Vec<String>,
}

impl AssetDefinition {
    pub fn record_format(&self) -> RecordFormat {
        self.log_format.unwrap_or(match self.kind {
            AssetKind::Ssh => RecordFormat::JsonEvent,
            AssetKind::Web => RecordFormat::TextLine,
        })
    }

    /// Configured markers, or the defaults for this kind and format.
    pub fn markers(&self) -> Vec<String> {
        if !self.attack_markers.is_empty() {
            return self.attack_markers.clone();
        }
        let defaults = match (self.kind, self.record_format()) {
            (_, RecordFormat::JsonEvent) => COWRIE_ATTACK_MARKERS,
            (AssetKind::Ssh, RecordFormat::TextLine) => SSH_TEXT_ATTACK_MARKERS,
            (AssetKind::Web, RecordFormat::TextLine) => WEB_TEXT_ATTACK_MARKERS,
        };
        defaults.iter().map(|m| m.to_string()).collect()
    }

    fn validate_schema(&self) -> Result<(), String> {
        if self.asset_id.trim().is_empty() {
            return Err("asset_id must not be empty".to_string());
        }
        if self.asset_id.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(format!("asset_id '{}' contains illegal characters", self.asset_id));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(format!("log_path for asset '{}' must not be empty", self.asset_id));
        }
        if self.attack_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(format!("asset '{}' has an empty attack marker", self.asset_id));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    assets: Vec<AssetDefinition>,
}

/// Validated pair of deception assets, one per honeypot kind.
#[derive(Debug, Clone)]
pub struct HoneypotRegistry {
    ssh: AssetDefinition,
    web: AssetDefinition,
    source: Option<PathBuf>,
}

impl HoneypotRegistry {
    /// Load from `DECEPTICLOUD_ASSET_CONFIG` if set, built-in defaults otherwise.
    pub fn from_env() -> Result<Self, DeceptionError> {
        match std::env::var(ASSET_CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(&path)),
            _ => {
                info!("{} not set, using built-in honeypot asset definitions", ASSET_CONFIG_ENV);
                Ok(Self::with_defaults())
            }
        }
    }

    /// Load and validate a registry file (FAIL-CLOSED on any violation).
    pub fn load(path: &Path) -> Result<Self, DeceptionError> {
        info!("Loading honeypot asset registry from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            DeceptionError::ConfigurationError(format!(
                "Failed to read asset registry {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: RegistryFile = serde_yaml::from_str(&content)?;
        let mut registry = Self::from_definitions(file.assets)?;
        registry.source = Some(path.to_path_buf());
        Ok(registry)
    }

    pub fn from_definitions(definitions: Vec<AssetDefinition>) -> Result<Self, DeceptionError> {
        let mut seen_ids = HashSet::new();
        let mut ssh = None;
        let mut web = None;

        for definition in definitions {
            definition.validate_schema().map_err(|e| {
                DeceptionError::RegistryValidationFailed(format!("FAIL-CLOSED: {}", e))
            })?;

            if !seen_ids.insert(definition.asset_id.clone()) {
                return Err(DeceptionError::RegistryValidationFailed(format!(
                    "FAIL-CLOSED: duplicate asset_id '{}'",
                    definition.asset_id
                )));
            }

            let slot = match definition.kind {
                AssetKind::Ssh => &mut ssh,
                AssetKind::Web => &mut web,
            };
            if slot.is_some() {
                return Err(DeceptionError::RegistryValidationFailed(format!(
                    "FAIL-CLOSED: more than one '{}' asset declared",
                    definition.kind
                )));
            }
            debug!("Registered {} asset: {}", definition.kind, definition.asset_id);
            *slot = Some(definition);
        }

        let ssh = ssh.ok_or_else(|| {
            DeceptionError::RegistryValidationFailed("FAIL-CLOSED: no 'ssh' asset declared".to_string())
        })?;
        let web = web.ok_or_else(|| {
            DeceptionError::RegistryValidationFailed("FAIL-CLOSED: no 'web' asset declared".to_string())
        })?;

        Ok(Self { ssh, web, source: None })
    }

    pub fn with_defaults() -> Self {
        Self {
            ssh: AssetDefinition {
                asset_id: DEFAULT_SSH_ASSET_ID.to_string(),
                kind: AssetKind::Ssh,
                log_path: PathBuf::from(DEFAULT_SSH_LOG_PATH),
                log_format: Some(RecordFormat::JsonEvent),
                attack_markers: Vec::new(),
            },
            web: AssetDefinition {
                asset_id: DEFAULT_WEB_ASSET_ID.to_string(),
                kind: AssetKind::Web,
                log_path: PathBuf::from(DEFAULT_WEB_LOG_PATH),
                log_format: Some(RecordFormat::TextLine),
                attack_markers: Vec::new(),
            },
            source: None,
        }
    }

    pub fn get(&self, kind: AssetKind) -> &AssetDefinition {
        match kind {
            AssetKind::Ssh => &self.ssh,
            AssetKind::Web => &self.web,
        }
    }

    pub fn asset_id(&self, kind: AssetKind) -> &str {
        &self.get(kind).asset_id
    }

    pub fn definitions(&self) -> [&AssetDefinition; 2] {
        [&self.ssh, &self.web]
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
