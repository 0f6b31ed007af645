//! Configuration parsing for stigview.toml
//!
//! Every section is optional and a missing file is not an error; the
//! built-in defaults are an empty asset, open-findings-only CSV POAMs and
//! the built-in CCI table. Command-line flags override what is set here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use stigview::{AssetInfo, CciMap};

use crate::error::{CliError, Result};

/// Root configuration structure for stigview.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StigviewConfig {
    /// Asset identity written into CKL and POAM exports
    #[serde(default)]
    pub asset: AssetInfo,

    /// POAM export defaults
    #[serde(default)]
    pub poam: PoamConfig,

    /// CCI table selection
    #[serde(default)]
    pub cci: CciConfig,
}

impl StigviewConfig {
    /// Load configuration, falling back to defaults when the file is absent
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Load configuration from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CliError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_str(&content, path)
    }

    /// Parse configuration from a string
    pub fn from_str(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The active CCI table: the configured JSON file, or the built-in one
    pub fn cci_map(&self) -> Result<CciMap> {
        match &self.cci.map {
            Some(path) => Ok(CciMap::from_file(path)?),
            None => Ok(CciMap::builtin()),
        }
    }
}

/// POAM export configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoamConfig {
    /// Also list not-reviewed findings
    #[serde(default)]
    pub include_non_reviewed: bool,

    /// Output format when `--format` is not given
    #[serde(default)]
    pub format: PoamFormat,
}

/// POAM output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PoamFormat {
    #[default]
    Csv,
    Json,
}

/// CCI table configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CciConfig {
    /// JSON table replacing the built-in one
    #[serde(default)]
    pub map: Option<PathBuf>,
}

/// Asset fields given on the command line
#[derive(Debug, Clone, Default, clap::Args)]
pub struct AssetArgs {
    /// Asset host name
    #[arg(long)]
    pub hostname: Option<String>,

    /// Asset IP address
    #[arg(long)]
    pub ip: Option<String>,

    /// Asset MAC address
    #[arg(long)]
    pub mac: Option<String>,

    /// Asset fully qualified domain name
    #[arg(long)]
    pub fqdn: Option<String>,
}

impl AssetArgs {
    /// Configured asset with every given flag applied on top
    pub fn resolve(&self, configured: &AssetInfo) -> AssetInfo {
        let pick = |flag: &Option<String>, fallback: &str| {
            flag.clone().unwrap_or_else(|| fallback.to_string())
        };
        AssetInfo {
            hostname: pick(&self.hostname, &configured.hostname),
            ip: pick(&self.ip, &configured.ip),
            mac: pick(&self.mac, &configured.mac),
            fqdn: pick(&self.fqdn, &configured.fqdn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = StigviewConfig::from_str("", Path::new("stigview.toml")).unwrap();
        assert_eq!(config.asset, AssetInfo::default());
        assert!(!config.poam.include_non_reviewed);
        assert_eq!(config.poam.format, PoamFormat::Csv);
        assert!(config.cci.map.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[asset]
hostname = "web01"
ip = "10.0.0.5"

[poam]
include_non_reviewed = true
format = "json"

[cci]
map = "/etc/stigview/cci.json"
"#;

        let config = StigviewConfig::from_str(toml, Path::new("stigview.toml")).unwrap();
        assert_eq!(config.asset.hostname, "web01");
        assert_eq!(config.asset.ip, "10.0.0.5");
        assert_eq!(config.asset.fqdn, "");
        assert!(config.poam.include_non_reviewed);
        assert_eq!(config.poam.format, PoamFormat::Json);
        assert_eq!(config.cci.map, Some(PathBuf::from("/etc/stigview/cci.json")));
    }

    #[test]
    fn test_invalid_config() {
        let err = StigviewConfig::from_str("[poam]\nformat = \"xlsx\"", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, CliError::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StigviewConfig::load(dir.path().join("stigview.toml")).unwrap();
        assert!(config.cci.map.is_none());
        assert!(!config.cci_map().unwrap().is_empty());
    }

    #[test]
    fn test_configured_cci_map() {
        let dir = tempfile::tempdir().unwrap();
        let map_path = dir.path().join("cci.json");
        std::fs::write(&map_path, r#"{"CCI-1": {"control": "AC-1"}}"#).unwrap();

        let config_path = dir.path().join("stigview.toml");
        std::fs::write(&config_path, format!("[cci]\nmap = {:?}\n", map_path)).unwrap();

        let config = StigviewConfig::load(&config_path).unwrap();
        let map = config.cci_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("CCI-1").unwrap().control, "AC-1");
    }

    #[test]
    fn test_asset_flags_override_config() {
        let configured = AssetInfo::new("cfg-host", "10.0.0.1", "aa:bb", "cfg.example.mil");
        let args = AssetArgs {
            hostname: Some("cli-host".into()),
            ..Default::default()
        };
        let asset = args.resolve(&configured);
        assert_eq!(asset.hostname, "cli-host");
        assert_eq!(asset.ip, "10.0.0.1");
        assert_eq!(asset.fqdn, "cfg.example.mil");
    }
}
