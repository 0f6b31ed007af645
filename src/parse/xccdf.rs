//! XCCDF benchmark parser
//!
//! Reads a DISA XCCDF benchmark (as shipped inside STIG ZIPs) into a
//! [`Stig`]. Each `Group` contributes its first `Rule`; review fields always
//! start empty because XCCDF carries no review state.

use tracing::{debug, trace};

use super::clean::clean_xccdf_description;
use super::first_text;
use crate::error::{ParseError, Result};
use crate::model::{Rule, Severity, Status, Stig};
use crate::xml::{Document, Element};

const TITLE_PREFIX: &str = "DPMS Target ";

/// Parse XCCDF benchmark XML.
///
/// Fails with [`ParseError::NoBenchmark`] when no `Benchmark` element exists,
/// namespaced or not.
///
/// # Example
///
/// ```
/// let xml = r#"<Benchmark><title>Demo</title>
///   <Group id="V-1"><Rule id="SV-1r1_rule" severity="high"><title>T</title></Rule></Group>
/// </Benchmark>"#;
/// let stig = stigview::parse_xccdf(xml)?;
/// assert_eq!(stig.rules[0].severity.label(), "CAT I");
/// # Ok::<(), stigview::ParseError>(())
/// ```
pub fn parse_xccdf(xml: &str) -> Result<Stig> {
    let doc = Document::parse(xml)?;
    let benchmark = doc.find("Benchmark").ok_or(ParseError::NoBenchmark)?;

    let title = first_text(benchmark, &["title", "Title"]).unwrap_or_else(|| "Unknown STIG".to_string());
    let title = match title.strip_prefix(TITLE_PREFIX) {
        Some(rest) => rest.to_string(),
        None => title,
    };

    let description = first_text(benchmark, &["description", "Description"]).unwrap_or_default();
    let version = first_text(benchmark, &["version", "Version"]).unwrap_or_default();
    let release_info = first_text(benchmark, &["plain-text", "release-info"]).unwrap_or_default();

    let groups = benchmark.find_all("Group");
    let rules: Vec<Rule> = groups
        .iter()
        .enumerate()
        .filter_map(|(index, group)| parse_group(index, group))
        .collect();

    debug!(
        title = %title,
        groups = groups.len(),
        rules = rules.len(),
        "Parsed XCCDF benchmark"
    );

    Ok(Stig {
        title,
        description,
        version,
        release_info,
        rules,
    })
}

/// Build the rule for one group; groups without a `Rule` produce nothing
fn parse_group(index: usize, group: &Element) -> Option<Rule> {
    let group_id = group.attribute("id").unwrap_or_default().to_string();
    let Some(rule) = group.find("Rule") else {
        trace!(group = %group_id, "Skipping group without Rule");
        return None;
    };

    let severity = rule
        .attribute("severity")
        .filter(|s| !s.is_empty())
        .unwrap_or("medium");

    let check_text = rule
        .find("check-content")
        .map(|el| el.text_content().trim().to_string())
        .unwrap_or_default();

    let cci_ids = rule
        .find_all("ident")
        .into_iter()
        .map(|el| el.text_content().trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    let stig_id = if group_id.is_empty() {
        synthetic_stig_id(index)
    } else {
        group_id.clone()
    };

    let id = match rule.attribute("id") {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("rule-{}", index),
    };

    let description = first_text(rule, &["description", "Description"]).unwrap_or_default();

    Some(Rule {
        id,
        stig_id,
        group_id,
        title: first_text(rule, &["title", "Title"]).unwrap_or_default(),
        severity: Severity::from_raw(severity),
        description: clean_xccdf_description(&description),
        check_text,
        fix_text: first_text(rule, &["fixtext", "fix", "Fix"]).unwrap_or_default(),
        cci_ids,
        status: Status::NotReviewed,
        finding_details: String::new(),
        comments: String::new(),
    })
}

/// Vulnerability id for documents whose groups lack an `id`
pub(crate) fn synthetic_stig_id(index: usize) -> String {
    format!("V-{}", 100_000 + index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BENCHMARK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Benchmark xmlns="http://checklists.nist.gov/xccdf/1.1" id="Demo_STIG">
  <status date="2024-01-24">accepted</status>
  <title>DPMS Target Demo Application Server</title>
  <description>This STIG provides guidance.</description>
  <plain-text id="release-info">Release: 3 Benchmark Date: 24 Jan 2024</plain-text>
  <version>2</version>
  <Group id="V-230221">
    <title>SRG-OS-000480-GPP-00227</title>
    <Rule id="SV-230221r858734_rule" weight="10.0" severity="high">
      <version>RHEL-08-010000</version>
      <title>The system must be a vendor-supported release.</title>
      <description>&lt;VulnDiscussion&gt;An operating system release is considered "supported"
        if the vendor continues to provide patches.&lt;/VulnDiscussion&gt;&lt;FalsePositives&gt;&lt;/FalsePositives&gt;&lt;Mitigations&gt;None&lt;/Mitigations&gt;&lt;IAControls&gt;&lt;/IAControls&gt;</description>
      <ident system="http://cyber.mil/legacy">V-73167</ident>
      <ident system="http://cyber.mil/cci">CCI-000366</ident>
      <fixtext fixref="F-32865r567410_fix">Upgrade to a supported version.</fixtext>
      <fix id="F-32865r567410_fix" />
      <check system="C-32890r567409_chk">
        <check-content-ref href="Demo_STIG.xml" name="M" />
        <check-content>
          Verify the version is vendor supported:
          $ cat /etc/redhat-release
        </check-content>
      </check>
    </Rule>
  </Group>
  <Group id="V-230222">
    <title>SRG-OS-000480-GPP-00227</title>
  </Group>
  <Group>
    <Rule>
      <title>Unnamed rule</title>
    </Rule>
  </Group>
</Benchmark>"#;

    #[test]
    fn test_document_metadata() {
        let stig = parse_xccdf(BENCHMARK).unwrap();
        assert_eq!(stig.title, "Demo Application Server");
        assert_eq!(stig.description, "This STIG provides guidance.");
        assert_eq!(stig.version, "2");
        assert_eq!(stig.release_info, "Release: 3 Benchmark Date: 24 Jan 2024");
    }

    #[test]
    fn test_rule_fields() {
        let stig = parse_xccdf(BENCHMARK).unwrap();
        let rule = &stig.rules[0];
        assert_eq!(rule.id, "SV-230221r858734_rule");
        assert_eq!(rule.stig_id, "V-230221");
        assert_eq!(rule.group_id, "V-230221");
        assert_eq!(rule.title, "The system must be a vendor-supported release.");
        assert_eq!(rule.severity, Severity::CatI);
        assert_eq!(
            rule.description,
            "An operating system release is considered \"supported\" if the vendor continues to provide patches."
        );
        assert_eq!(rule.fix_text, "Upgrade to a supported version.");
        assert!(rule.check_text.starts_with("Verify the version is vendor supported:"));
        assert!(rule.check_text.ends_with("$ cat /etc/redhat-release"));
        assert_eq!(rule.cci_ids, vec!["V-73167", "CCI-000366"]);
        assert_eq!(rule.status, Status::NotReviewed);
        assert!(rule.finding_details.is_empty());
        assert!(rule.comments.is_empty());
    }

    #[test]
    fn test_groups_without_rule_are_skipped() {
        let stig = parse_xccdf(BENCHMARK).unwrap();
        assert_eq!(stig.rules.len(), 2);
    }

    #[test]
    fn test_synthetic_ids_use_group_position() {
        let stig = parse_xccdf(BENCHMARK).unwrap();
        let rule = &stig.rules[1];
        // Third group overall, the skipped group still counts
        assert_eq!(rule.stig_id, "V-100002");
        assert_eq!(rule.id, "rule-2");
        assert_eq!(rule.group_id, "");
        assert_eq!(rule.severity, Severity::CatII);
        assert!(rule.cci_ids.is_empty());
    }

    #[test]
    fn test_single_group_scenario() {
        let xml = r#"<Benchmark><Group id="SRG-APP-000001"><Rule id="SV-1r1" severity="high"><title>T</title></Rule></Group></Benchmark>"#;
        let stig = parse_xccdf(xml).unwrap();
        assert_eq!(stig.rules.len(), 1);
        let rule = &stig.rules[0];
        assert_eq!(rule.stig_id, "SRG-APP-000001");
        assert_eq!(rule.id, "SV-1r1");
        assert_eq!(rule.severity, Severity::CatI);
        assert_eq!(rule.status, Status::NotReviewed);
    }

    #[test]
    fn test_missing_benchmark_is_an_error() {
        let err = parse_xccdf("<CHECKLIST><ASSET/></CHECKLIST>").unwrap_err();
        assert_eq!(err, ParseError::NoBenchmark);
    }

    #[test]
    fn test_prefixed_namespace() {
        let xml = r#"<cdf:Benchmark xmlns:cdf="http://checklists.nist.gov/xccdf/1.2">
  <cdf:title>Prefixed</cdf:title>
  <cdf:Group id="V-9"><cdf:Rule id="SV-9" severity="low"><cdf:title>Nine</cdf:title>
    <cdf:ident system="http://cyber.mil/cci">CCI-000001</cdf:ident></cdf:Rule></cdf:Group>
</cdf:Benchmark>"#;
        let stig = parse_xccdf(xml).unwrap();
        assert_eq!(stig.title, "Prefixed");
        assert_eq!(stig.rules.len(), 1);
        assert_eq!(stig.rules[0].title, "Nine");
        assert_eq!(stig.rules[0].severity, Severity::CatIII);
        assert_eq!(stig.rules[0].cci_ids, vec!["CCI-000001"]);
    }

    #[test]
    fn test_defaults_for_bare_benchmark() {
        let stig = parse_xccdf("<Benchmark/>").unwrap();
        assert_eq!(stig.title, "Unknown STIG");
        assert_eq!(stig.version, "");
        assert_eq!(stig.release_info, "");
        assert!(stig.rules.is_empty());
    }

    #[test]
    fn test_crlf_benchmark_has_no_content_changes() {
        let crlf = BENCHMARK.replace('\n', "\r\n");
        let a = parse_xccdf(BENCHMARK).unwrap();
        let b = parse_xccdf(&crlf).unwrap();
        assert!(!b.rules[0].check_text.contains('\r'));
        assert_eq!(a, b);
        assert!(crate::diff_stigs(&a, &b).is_empty());
    }

    #[test]
    fn test_fix_fallback_and_capitalized_tags() {
        let xml = r#"<Benchmark><Title>Caps</Title><Group id="V-1"><Rule id="R" severity="bogus">
  <Title>Capital title</Title><Description>Capital description</Description><Fix>Capital fix</Fix>
</Rule></Group></Benchmark>"#;
        let stig = parse_xccdf(xml).unwrap();
        assert_eq!(stig.title, "Caps");
        let rule = &stig.rules[0];
        assert_eq!(rule.title, "Capital title");
        assert_eq!(rule.description, "Capital description");
        assert_eq!(rule.fix_text, "Capital fix");
        assert_eq!(rule.severity, Severity::CatII);
    }
}
