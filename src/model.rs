//! Canonical checklist model
//!
//! Every parser produces a [`Stig`] and every exporter consumes one. The
//! serde representation uses camelCase keys, which is the payload shape a
//! catalog backend hands to the viewer.
//!
//! Severity and status are closed enumerations. Raw vocabularies from the
//! source documents go through the lookup tables below; anything outside
//! them falls back to [`Severity::CatII`] / [`Status::NotReviewed`].

use serde::{Deserialize, Deserializer, Serialize};

/// Raw XCCDF/CKL severity vocabulary to CAT category
const SEVERITY_TABLE: [(&str, Severity); 3] = [
    ("high", Severity::CatI),
    ("medium", Severity::CatII),
    ("low", Severity::CatIII),
];

/// Finding status to the `STATUS` text written into CKL files
const STATUS_CKL_TABLE: [(Status, &str); 4] = [
    (Status::NotReviewed, "Not_Reviewed"),
    (Status::NotAFinding, "NotAFinding"),
    (Status::Open, "Open"),
    (Status::NotApplicable, "Not_Applicable"),
];

/// STIG severity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum Severity {
    /// CAT I - High severity
    #[serde(rename = "CAT I")]
    CatI,
    /// CAT II - Medium severity
    #[default]
    #[serde(rename = "CAT II")]
    CatII,
    /// CAT III - Low severity
    #[serde(rename = "CAT III")]
    CatIII,
}

impl Severity {
    /// All categories, most severe first
    pub const ALL: [Severity; 3] = [Self::CatI, Self::CatII, Self::CatIII];

    /// Map a raw source value (`high`, `medium`, `low`).
    ///
    /// The match is exact; callers that accept mixed case lower-case first.
    pub fn from_raw(raw: &str) -> Self {
        SEVERITY_TABLE
            .iter()
            .find(|(key, _)| *key == raw)
            .map(|(_, sev)| *sev)
            .unwrap_or_default()
    }

    /// The raw vocabulary value written back into CKL files
    pub fn as_raw(&self) -> &'static str {
        SEVERITY_TABLE
            .iter()
            .find(|(_, sev)| sev == self)
            .map(|(key, _)| *key)
            .unwrap_or("medium")
    }

    /// Display label (`CAT I`, `CAT II`, `CAT III`)
    pub fn label(&self) -> &'static str {
        match self {
            Self::CatI => "CAT I",
            Self::CatII => "CAT II",
            Self::CatIII => "CAT III",
        }
    }

    /// Parse a display label, falling back to CAT II
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|sev| sev.label() == label)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Review state of a single rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    NotReviewed,
    NotAFinding,
    Open,
    NotApplicable,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Self::NotReviewed,
        Self::NotAFinding,
        Self::Open,
        Self::NotApplicable,
    ];

    /// Map CKL `STATUS` text; unknown or empty text means not reviewed
    pub fn from_ckl(raw: &str) -> Self {
        match raw {
            "NotAFinding" | "Not_A_Finding" => Self::NotAFinding,
            "Open" => Self::Open,
            "Not_Applicable" | "NotApplicable" => Self::NotApplicable,
            _ => Self::NotReviewed,
        }
    }

    /// `STATUS` text for CKL export
    pub fn as_ckl(&self) -> &'static str {
        STATUS_CKL_TABLE
            .iter()
            .find(|(status, _)| status == self)
            .map(|(_, text)| *text)
            .unwrap_or("Not_Reviewed")
    }

    /// Model key (`not_reviewed`, `open`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotReviewed => "not_reviewed",
            Self::NotAFinding => "not_a_finding",
            Self::Open => "open",
            Self::NotApplicable => "not_applicable",
        }
    }

    /// Parse a model key, falling back to not reviewed
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .unwrap_or_default()
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotReviewed => "Not Reviewed",
            Self::NotAFinding => "Not a Finding",
            Self::Open => "Open",
            Self::NotApplicable => "Not Applicable",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(Self::from_key(&key))
    }
}

/// One checklist item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// XCCDF rule id / CKL `Rule_ID` (e.g. "SV-230221r858734_rule")
    pub id: String,

    /// Vulnerability id (e.g. "V-230221"), the key used across versions
    pub stig_id: String,

    #[serde(default)]
    pub group_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub severity: Severity,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub check_text: String,

    #[serde(default)]
    pub fix_text: String,

    /// Control correlation identifiers in document order
    #[serde(default)]
    pub cci_ids: Vec<String>,

    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub finding_details: String,

    #[serde(default)]
    pub comments: String,
}

impl Rule {
    /// Apply the `Some` fields of an update, returning the new rule
    pub fn with_update(&self, update: &RuleUpdate) -> Self {
        let mut rule = self.clone();
        if let Some(status) = update.status {
            rule.status = status;
        }
        if let Some(ref details) = update.finding_details {
            rule.finding_details = details.clone();
        }
        if let Some(ref comments) = update.comments {
            rule.comments = comments.clone();
        }
        rule
    }
}

/// User edits to the review fields of a rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleUpdate {
    pub status: Option<Status>,
    pub finding_details: Option<String>,
    pub comments: Option<String>,
}

impl RuleUpdate {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn finding_details(mut self, details: impl Into<String>) -> Self {
        self.finding_details = Some(details.into());
        self
    }

    pub fn comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }
}

/// One checklist document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stig {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub version: String,

    /// Free text such as "Release: 3 Benchmark Date: 24 Jan 2024"
    #[serde(default)]
    pub release_info: String,

    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Stig {
    /// Parse the JSON payload shape produced by [`Stig::to_json`]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// New document where every rule with `rule_id` has `update` applied
    pub fn with_rule_updated(&self, rule_id: &str, update: &RuleUpdate) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .map(|r| {
                    if r.id == rule_id {
                        r.with_update(update)
                    } else {
                        r.clone()
                    }
                })
                .collect(),
            ..self.clone_header()
        }
    }

    /// New document with the same status on every rule
    pub fn with_all_status(&self, status: Status) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .map(|r| Rule {
                    status,
                    ..r.clone()
                })
                .collect(),
            ..self.clone_header()
        }
    }

    /// Find a rule by its vulnerability id
    pub fn rule_by_stig_id(&self, stig_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.stig_id == stig_id)
    }

    fn clone_header(&self) -> Self {
        Self {
            title: self.title.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            release_info: self.release_info.clone(),
            rules: Vec::new(),
        }
    }
}

/// Identity of the assessed asset, written into CKL and POAM exports
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetInfo {
    pub hostname: String,
    pub ip: String,
    pub mac: String,
    pub fqdn: String,
}

impl AssetInfo {
    pub fn new(
        hostname: impl Into<String>,
        ip: impl Into<String>,
        mac: impl Into<String>,
        fqdn: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            ip: ip.into(),
            mac: mac.into(),
            fqdn: fqdn.into(),
        }
    }
}
