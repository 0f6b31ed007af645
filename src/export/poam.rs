//! Plan of Action and Milestones (POAM) export
//!
//! One shared row builder feeds both the CSV and the JSON output, so the
//! two formats always carry identical content. Findings marked
//! `not_a_finding` or `not_applicable` never appear; `not_reviewed` findings
//! appear only when explicitly requested.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cci::CciMap;
use crate::model::{AssetInfo, Rule, Status, Stig};

/// Column headers, in output order
pub const POAM_HEADERS: [&str; 16] = [
    "Control Vulnerability ID",
    "Office / Org",
    "Security Control Number (800-53)",
    "Weakness Name",
    "Weakness Description",
    "Weakness Detector Source",
    "Weakness Source Identifier",
    "Asset Identifier",
    "Point of Contact",
    "Resources Required",
    "Scheduled Completion Date",
    "Milestone with Completion Dates",
    "Milestone Changes",
    "Source Identifying Control Vulnerability",
    "Status",
    "Comments",
];

/// One POAM row. Serializes as an object keyed by [`POAM_HEADERS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoamEntry {
    #[serde(rename = "Control Vulnerability ID")]
    pub control_vulnerability_id: String,
    #[serde(rename = "Office / Org")]
    pub office_org: String,
    #[serde(rename = "Security Control Number (800-53)")]
    pub security_control_number: String,
    #[serde(rename = "Weakness Name")]
    pub weakness_name: String,
    #[serde(rename = "Weakness Description")]
    pub weakness_description: String,
    #[serde(rename = "Weakness Detector Source")]
    pub weakness_detector_source: String,
    #[serde(rename = "Weakness Source Identifier")]
    pub weakness_source_identifier: String,
    #[serde(rename = "Asset Identifier")]
    pub asset_identifier: String,
    #[serde(rename = "Point of Contact")]
    pub point_of_contact: String,
    #[serde(rename = "Resources Required")]
    pub resources_required: String,
    #[serde(rename = "Scheduled Completion Date")]
    pub scheduled_completion_date: String,
    #[serde(rename = "Milestone with Completion Dates")]
    pub milestones: String,
    #[serde(rename = "Milestone Changes")]
    pub milestone_changes: String,
    #[serde(rename = "Source Identifying Control Vulnerability")]
    pub source_identifying_control_vulnerability: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Comments")]
    pub comments: String,
}

impl PoamEntry {
    /// Values in [`POAM_HEADERS`] order
    pub fn columns(&self) -> [&str; 16] {
        [
            &self.control_vulnerability_id,
            &self.office_org,
            &self.security_control_number,
            &self.weakness_name,
            &self.weakness_description,
            &self.weakness_detector_source,
            &self.weakness_source_identifier,
            &self.asset_identifier,
            &self.point_of_contact,
            &self.resources_required,
            &self.scheduled_completion_date,
            &self.milestones,
            &self.milestone_changes,
            &self.source_identifying_control_vulnerability,
            &self.status,
            &self.comments,
        ]
    }
}

/// Whether a rule with `status` belongs in a POAM
pub fn is_poam_finding(status: Status, include_non_reviewed: bool) -> bool {
    match status {
        Status::Open => true,
        Status::NotReviewed => include_non_reviewed,
        Status::NotAFinding | Status::NotApplicable => false,
    }
}

/// POAM rows as CSV text: header line plus one line per finding
pub fn export_poam_csv(
    stig: &Stig,
    asset: &AssetInfo,
    cci_map: &CciMap,
    include_non_reviewed: bool,
) -> String {
    let rows = build_rows(stig, asset, cci_map, include_non_reviewed);
    let header = csv_line(POAM_HEADERS);
    let body = rows
        .iter()
        .map(|row| csv_line(row.columns()))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n{}", header, body)
}

/// POAM rows for JSON output
pub fn export_poam_json(
    stig: &Stig,
    asset: &AssetInfo,
    cci_map: &CciMap,
    include_non_reviewed: bool,
) -> Vec<PoamEntry> {
    build_rows(stig, asset, cci_map, include_non_reviewed)
}

fn build_rows(
    stig: &Stig,
    asset: &AssetInfo,
    cci_map: &CciMap,
    include_non_reviewed: bool,
) -> Vec<PoamEntry> {
    let source = source_identifier(stig);
    let rows: Vec<PoamEntry> = stig
        .rules
        .iter()
        .filter(|r| is_poam_finding(r.status, include_non_reviewed))
        .map(|r| build_row(stig, r, asset, cci_map, &source))
        .collect();

    debug!(
        total = stig.rules.len(),
        findings = rows.len(),
        include_non_reviewed,
        "Built POAM rows"
    );
    rows
}

fn build_row(stig: &Stig, rule: &Rule, asset: &AssetInfo, cci_map: &CciMap, source: &str) -> PoamEntry {
    PoamEntry {
        control_vulnerability_id: rule.stig_id.clone(),
        office_org: asset.hostname.clone(),
        security_control_number: cci_map.resolve_controls(&rule.cci_ids),
        weakness_name: rule.title.clone(),
        weakness_description: rule.description.clone(),
        weakness_detector_source: format!("DISA STIG: {}", stig.title),
        weakness_source_identifier: rule.id.clone(),
        asset_identifier: asset.hostname.clone(),
        source_identifying_control_vulnerability: source.to_string(),
        status: if rule.status == Status::Open {
            "Ongoing"
        } else {
            "Submitted"
        }
        .to_string(),
        comments: rule.comments.clone(),
        ..Default::default()
    }
}

/// "<title> v<version> <release info>", trimmed at the ends only
fn source_identifier(stig: &Stig) -> String {
    let version = if stig.version.is_empty() {
        String::new()
    } else {
        format!("v{}", stig.version)
    };
    format!("{} {} {}", stig.title, version, stig.release_info)
        .trim()
        .to_string()
}

fn csv_line<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(csv_field)
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote a field containing a comma, quote or newline; double inner quotes
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
