//! CKL serializer
//!
//! Writes the DISA checklist layout that STIG Viewer imports: one `ASSET`,
//! one `iSTIG` with `STIG_INFO`, and one `VULN` per rule. Only modeled
//! fields are written; asset and override fields outside the model are
//! emitted as empty placeholders.

use quick_xml::escape::escape;

use crate::model::{AssetInfo, Rule, Stig};

/// Serialize `stig` as CKL XML. Deterministic for identical input.
pub fn export_ckl(stig: &Stig, asset: &AssetInfo) -> String {
    let mut out = CklWriter::default();

    out.line(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.line("<!--DISA STIG Viewer :: Web STIG Viewer Export-->");
    out.line("<CHECKLIST>");
    out.line("  <ASSET>");
    out.line("    <ROLE>None</ROLE>");
    out.line("    <ASSET_TYPE>Computing</ASSET_TYPE>");
    out.element(4, "HOST_NAME", &asset.hostname);
    out.element(4, "HOST_IP", &asset.ip);
    out.element(4, "HOST_MAC", &asset.mac);
    out.element(4, "HOST_FQDN", &asset.fqdn);
    out.line("    <TARGET_COMMENT></TARGET_COMMENT>");
    out.line("    <TECH_AREA></TECH_AREA>");
    out.line("    <TARGET_KEY></TARGET_KEY>");
    out.line("    <WEB_OR_DATABASE>false</WEB_OR_DATABASE>");
    out.line("    <WEB_DB_SITE></WEB_DB_SITE>");
    out.line("    <WEB_DB_INSTANCE></WEB_DB_INSTANCE>");
    out.line("  </ASSET>");
    out.line("  <STIGS>");
    out.line("    <iSTIG>");
    out.line("      <STIG_INFO>");
    out.si_data("title", &stig.title);
    out.si_data("version", &stig.version);
    out.si_data("releaseinfo", &stig.release_info);
    out.line("      </STIG_INFO>");

    for rule in &stig.rules {
        out.vuln(rule);
    }

    out.line("    </iSTIG>");
    out.line("  </STIGS>");
    out.line("</CHECKLIST>");

    out.finish()
}

/// Line-oriented writer; lines are joined with `\n` and no trailing newline
#[derive(Default)]
struct CklWriter {
    lines: Vec<String>,
}

impl CklWriter {
    fn line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn element(&mut self, indent: usize, tag: &str, text: &str) {
        self.lines.push(format!(
            "{:indent$}<{tag}>{}</{tag}>",
            "",
            escape(text),
            indent = indent,
        ));
    }

    fn si_data(&mut self, name: &str, value: &str) {
        self.lines.push(format!(
            "        <SI_DATA><SID_NAME>{}</SID_NAME><SID_DATA>{}</SID_DATA></SI_DATA>",
            escape(name),
            escape(value),
        ));
    }

    fn stig_data(&mut self, attribute: &str, value: &str) {
        self.lines.push(format!(
            "        <STIG_DATA><VULN_ATTRIBUTE>{}</VULN_ATTRIBUTE><ATTRIBUTE_DATA>{}</ATTRIBUTE_DATA></STIG_DATA>",
            escape(attribute),
            escape(value),
        ));
    }

    fn vuln(&mut self, rule: &Rule) {
        self.line("      <VULN>");
        self.stig_data("Vuln_Num", &rule.stig_id);
        self.stig_data("Severity", rule.severity.as_raw());
        self.stig_data("Group_Title", &rule.group_id);
        self.stig_data("Rule_ID", &rule.id);
        self.stig_data("Rule_Title", &rule.title);
        self.stig_data("Vuln_Discuss", &rule.description);
        self.stig_data("Check_Content", &rule.check_text);
        self.stig_data("Fix_Text", &rule.fix_text);
        for cci in &rule.cci_ids {
            self.stig_data("CCI_REF", cci);
        }
        self.element(8, "STATUS", rule.status.as_ckl());
        self.element(8, "FINDING_DETAILS", &rule.finding_details);
        self.element(8, "COMMENTS", &rule.comments);
        self.line("        <SEVERITY_OVERRIDE></SEVERITY_OVERRIDE>");
        self.line("        <SEVERITY_JUSTIFICATION></SEVERITY_JUSTIFICATION>");
        self.line("      </VULN>");
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}
