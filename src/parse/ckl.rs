//! DISA checklist (CKL) parser
//!
//! CKL is itself a review artifact, so status, finding details and comments
//! are imported along with the rule content. Parsing never fails: missing
//! pieces fall back to defaults, and text that is not well-formed XML yields
//! an empty "Imported Checklist".

use std::collections::HashMap;

use tracing::debug;

use super::clean::clean_ckl_description;
use super::xccdf::synthetic_stig_id;
use crate::error::Result;
use crate::model::{Rule, Severity, Status, Stig};
use crate::xml::{Document, Element};

const DEFAULT_TITLE: &str = "Imported Checklist";

/// Parse CKL checklist XML.
///
/// Always returns `Ok`. A checklist without `STIG_INFO` is titled
/// "Imported Checklist"; unreadable XML gives that title and no rules.
pub fn parse_ckl(xml: &str) -> Result<Stig> {
    let doc = match Document::parse(xml) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "CKL is not well-formed, importing empty checklist");
            return Ok(Stig {
                title: DEFAULT_TITLE.to_string(),
                description: String::new(),
                version: String::new(),
                release_info: String::new(),
                rules: Vec::new(),
            });
        }
    };

    let mut title = String::new();
    let mut version = String::new();
    let mut release_info = String::new();

    if let Some(info) = doc.elements_by_tag_name("STIG_INFO").next() {
        for si in info.elements_by_tag_name("SI_DATA") {
            let value = si.child_text("SID_DATA");
            match si.child_text("SID_NAME").as_str() {
                "title" => title = value,
                "version" => version = value,
                "releaseinfo" => release_info = value,
                _ => {}
            }
        }
    }

    let rules: Vec<Rule> = doc
        .elements_by_tag_name("VULN")
        .enumerate()
        .map(|(index, vuln)| parse_vuln(index, vuln))
        .collect();

    if title.is_empty() {
        title = DEFAULT_TITLE.to_string();
    }

    debug!(title = %title, rules = rules.len(), "Parsed CKL checklist");

    Ok(Stig {
        title,
        description: String::new(),
        version,
        release_info,
        rules,
    })
}

/// `STIG_DATA` pairs of one `VULN`; repeated `CCI_REF` values accumulate
#[derive(Debug, Default)]
struct VulnAttributes {
    values: HashMap<String, String>,
    cci_ids: Vec<String>,
}

impl VulnAttributes {
    fn collect(vuln: &Element) -> Self {
        let mut attrs = Self::default();
        for data in vuln.elements_by_tag_name("STIG_DATA") {
            let name = data.child_text("VULN_ATTRIBUTE");
            let value = data.child_text("ATTRIBUTE_DATA");
            if name == "CCI_REF" {
                attrs.cci_ids.push(value);
            } else {
                attrs.values.insert(name, value);
            }
        }
        attrs
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn text(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }
}

fn parse_vuln(index: usize, vuln: &Element) -> Rule {
    let mut attrs = VulnAttributes::collect(vuln);

    let severity = attrs.get("Severity").unwrap_or("medium").to_lowercase();

    Rule {
        id: attrs
            .get("Rule_ID")
            .map(str::to_string)
            .unwrap_or_else(|| format!("rule-{}", index)),
        stig_id: attrs
            .get("Vuln_Num")
            .map(str::to_string)
            .unwrap_or_else(|| synthetic_stig_id(index)),
        group_id: attrs.text("Group_Title"),
        title: attrs.text("Rule_Title"),
        severity: Severity::from_raw(&severity),
        description: clean_ckl_description(attrs.get("Vuln_Discuss").unwrap_or_default()),
        check_text: attrs.text("Check_Content"),
        fix_text: attrs
            .get("Fix_Text")
            .or_else(|| attrs.get("STIGRef"))
            .unwrap_or_default()
            .to_string(),
        cci_ids: std::mem::take(&mut attrs.cci_ids),
        status: Status::from_ckl(&vuln.child_text("STATUS")),
        finding_details: vuln.child_text("FINDING_DETAILS"),
        comments: vuln.child_text("COMMENTS"),
    }
}
