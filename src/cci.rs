//! CCI to NIST SP 800-53 control lookup
//!
//! POAM exports resolve a rule's CCI references to control numbers through
//! a [`CciMap`]. The table is plain data: the built-in set below covers the
//! CCIs most common in DISA STIGs, and a full DISA CCI list can be supplied
//! as JSON instead.
//!
//! # Usage
//!
//! ```
//! use stigview::CciMap;
//!
//! let map = CciMap::builtin();
//! assert_eq!(map.get("CCI-000366").map(|m| m.control.as_str()), Some("CM-6 b"));
//!
//! let custom = CciMap::from_json(r#"{"CCI-1": {"control": "AC-1", "title": "Policy"}}"#)?;
//! assert_eq!(custom.resolve_controls(&["CCI-1".to_string()]), "AC-1");
//! # Ok::<(), stigview::CciMapError>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CciMapError;

/// Control referenced by a CCI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CciMapping {
    /// SP 800-53 control, e.g. "AC-7 a"
    pub control: String,
    /// Short control title
    #[serde(default)]
    pub title: String,
}

/// Immutable CCI lookup table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CciMap {
    entries: HashMap<String, CciMapping>,
}

impl CciMap {
    /// Table with no entries; every CCI resolves to nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN.iter().map(|(id, control, title)| {
            (
                id.to_string(),
                CciMapping {
                    control: control.to_string(),
                    title: title.to_string(),
                },
            )
        }))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, CciMapping)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Parse a JSON object keyed by CCI id
    pub fn from_json(json: &str) -> Result<Self, CciMapError> {
        let entries: HashMap<String, CciMapping> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    /// Load a JSON table from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CciMapError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CciMapError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn get(&self, cci_id: &str) -> Option<&CciMapping> {
        self.entries.get(cci_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unique controls for `cci_ids` in first-seen order, joined with ", ".
    ///
    /// CCIs without a mapping are skipped.
    pub fn resolve_controls(&self, cci_ids: &[String]) -> String {
        let mut seen = HashSet::new();
        cci_ids
            .iter()
            .filter_map(|id| self.get(id))
            .map(|m| m.control.as_str())
            .filter(|control| !control.is_empty() && seen.insert(*control))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// CCIs from `cci_ids` that have no mapping
    pub fn unmapped<'a>(&self, cci_ids: &'a [String]) -> Vec<&'a str> {
        cci_ids
            .iter()
            .filter(|id| !self.entries.contains_key(id.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// (CCI, control, title)
const BUILTIN: &[(&str, &str, &str)] = &[
    // AC: Access Control
    ("CCI-000015", "AC-2 (1)", "Automated System Account Management"),
    ("CCI-000016", "AC-2 (2)", "Automated Temporary and Emergency Account Management"),
    ("CCI-000018", "AC-2 (4)", "Automated Audit Actions"),
    ("CCI-000044", "AC-7 a", "Unsuccessful Logon Attempts"),
    ("CCI-000048", "AC-8 a", "System Use Notification"),
    ("CCI-000054", "AC-10", "Concurrent Session Control"),
    ("CCI-000056", "AC-11 b", "Device Lock"),
    ("CCI-000057", "AC-11 a", "Device Lock"),
    ("CCI-000060", "AC-11 (1)", "Pattern-hiding Displays"),
    ("CCI-000213", "AC-3", "Access Enforcement"),
    ("CCI-001453", "AC-17 (2)", "Protection of Confidentiality and Integrity Using Encryption"),
    ("CCI-002038", "IA-11", "Re-authentication"),
    ("CCI-002235", "AC-6 (10)", "Prohibit Non-privileged Users from Executing Privileged Functions"),
    ("CCI-002361", "AC-12", "Session Termination"),
    // AU: Audit and Accountability
    ("CCI-000130", "AU-3 a", "Content of Audit Records"),
    ("CCI-000131", "AU-3 b", "Content of Audit Records"),
    ("CCI-000132", "AU-3 c", "Content of Audit Records"),
    ("CCI-000133", "AU-3 d", "Content of Audit Records"),
    ("CCI-000134", "AU-3 e", "Content of Audit Records"),
    ("CCI-000135", "AU-3 (1)", "Additional Audit Information"),
    ("CCI-000139", "AU-5 a", "Response to Audit Logging Process Failures"),
    ("CCI-000162", "AU-9", "Protection of Audit Information"),
    ("CCI-000163", "AU-9", "Protection of Audit Information"),
    ("CCI-000164", "AU-9", "Protection of Audit Information"),
    ("CCI-000169", "AU-12 a", "Audit Record Generation"),
    ("CCI-000172", "AU-12 c", "Audit Record Generation"),
    ("CCI-001849", "AU-4", "Audit Log Storage Capacity"),
    ("CCI-001851", "AU-4 (1)", "Transfer to Alternate Storage"),
    // CM: Configuration Management
    ("CCI-000366", "CM-6 b", "Configuration Settings"),
    ("CCI-000381", "CM-7 a", "Least Functionality"),
    ("CCI-000382", "CM-7 b", "Least Functionality"),
    ("CCI-001744", "CM-3 (5)", "Automated Security Response"),
    ("CCI-001764", "CM-7 (2)", "Prevent Program Execution"),
    ("CCI-001774", "CM-7 (5) (b)", "Authorized Software - Allow-by-exception"),
    // IA: Identification and Authentication
    ("CCI-000192", "IA-5 (1) (a)", "Password-based Authentication"),
    ("CCI-000193", "IA-5 (1) (a)", "Password-based Authentication"),
    ("CCI-000194", "IA-5 (1) (a)", "Password-based Authentication"),
    ("CCI-000195", "IA-5 (1) (b)", "Password-based Authentication"),
    ("CCI-000196", "IA-5 (1) (c)", "Password-based Authentication"),
    ("CCI-000197", "IA-5 (1) (c)", "Password-based Authentication"),
    ("CCI-000198", "IA-5 (1) (d)", "Password-based Authentication"),
    ("CCI-000199", "IA-5 (1) (d)", "Password-based Authentication"),
    ("CCI-000200", "IA-5 (1) (e)", "Password-based Authentication"),
    ("CCI-000205", "IA-5 (1) (a)", "Password-based Authentication"),
    ("CCI-000764", "IA-2", "Identification and Authentication (Organizational Users)"),
    ("CCI-000765", "IA-2 (1)", "Multi-factor Authentication to Privileged Accounts"),
    ("CCI-000766", "IA-2 (2)", "Multi-factor Authentication to Non-privileged Accounts"),
    ("CCI-000803", "IA-7", "Cryptographic Module Authentication"),
    ("CCI-001948", "IA-2 (11)", "Remote Access - Separate Device"),
    // SC: System and Communications Protection
    ("CCI-001199", "SC-28", "Protection of Information at Rest"),
    ("CCI-002418", "SC-8", "Transmission Confidentiality and Integrity"),
    ("CCI-002421", "SC-8 (1)", "Cryptographic Protection"),
    ("CCI-002450", "SC-13 b", "Cryptographic Protection"),
    ("CCI-002475", "SC-28 (1)", "Cryptographic Protection"),
    ("CCI-001133", "SC-10", "Network Disconnect"),
    // SI: System and Information Integrity
    ("CCI-001310", "SI-10", "Information Input Validation"),
    ("CCI-001312", "SI-11 a", "Error Handling"),
    ("CCI-001314", "SI-11 b", "Error Handling"),
    ("CCI-002617", "SI-2 (6)", "Removal of Previous Versions of Software and Firmware"),
    ("CCI-002696", "SI-6 a", "Security and Privacy Function Verification"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builtin_ids_are_unique_and_well_formed() {
        let mut seen = HashSet::new();
        for (id, control, _) in BUILTIN {
            assert!(id.starts_with("CCI-"), "Invalid CCI id: {}", id);
            assert!(!control.is_empty(), "{} has no control", id);
            assert!(seen.insert(*id), "Duplicate CCI: {}", id);
        }
        assert_eq!(CciMap::builtin().len(), BUILTIN.len());
    }

    #[test]
    fn test_resolve_controls_dedups_and_skips_unmapped() {
        let map = CciMap::builtin();
        let controls = map.resolve_controls(&ids(&[
            "CCI-000162",
            "CCI-999999",
            "CCI-000163",
            "CCI-000366",
        ]));
        assert_eq!(controls, "AU-9, CM-6 b");
    }

    #[test]
    fn test_resolve_controls_empty() {
        assert_eq!(CciMap::builtin().resolve_controls(&[]), "");
        assert_eq!(CciMap::empty().resolve_controls(&ids(&["CCI-000366"])), "");
    }

    #[test]
    fn test_unmapped() {
        let map = CciMap::builtin();
        let cci = ids(&["CCI-000366", "CCI-123456"]);
        assert_eq!(map.unmapped(&cci), vec!["CCI-123456"]);
    }

    #[test]
    fn test_from_json() {
        let map = CciMap::from_json(
            r#"{"CCI-000001": {"control": "AC-1 a 1", "title": "Policy and Procedures"},
                "CCI-000002": {"control": "AC-1 a 1"}}"#,
        )
        .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("CCI-000002").unwrap().title, "");
        assert!(CciMap::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cci.json");
        std::fs::write(&path, r#"{"CCI-1": {"control": "SC-8", "title": "T"}}"#).unwrap();
        let map = CciMap::from_file(&path).unwrap();
        assert_eq!(map.get("CCI-1").unwrap().control, "SC-8");

        let err = CciMap::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CciMapError::Read { .. }));
    }
}
