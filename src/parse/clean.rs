//! Description text cleanup
//!
//! XCCDF and CKL discussions embed DISA markup (`<VulnDiscussion>` and
//! friends) as escaped text. XCCDF drops the boilerplate subsections
//! entirely; CKL only unwraps the discussion and strips remaining tags.

use std::sync::OnceLock;

use regex::Regex;

/// DISA subsections removed together with their content
const SUBSECTION_TAGS: &[&str] = &[
    "FalsePositives",
    "FalseNegatives",
    "Documentable",
    "Mitigations",
    "SeverityOverrideGuidance",
    "PotentialImpacts",
    "ThirdPartyTools",
    "MitigationControl",
    "Responsibility",
    "IAControls",
];

/// Compiled cleanup patterns. All sources are literals; a pattern that fails
/// to compile is skipped rather than aborting the parse.
struct Patterns {
    subsections: Vec<Regex>,
    wrapper: Option<Regex>,
    tag: Option<Regex>,
}

impl Patterns {
    fn compile() -> Self {
        Self {
            subsections: SUBSECTION_TAGS
                .iter()
                .filter_map(|tag| Regex::new(&format!(r"(?is)<{tag}>.*?</{tag}>")).ok())
                .collect(),
            wrapper: Regex::new(r"(?i)</?VulnDiscussion>").ok(),
            tag: Regex::new(r"<[^>]+>").ok(),
        }
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::compile)
}

fn replace_all(pattern: Option<&Regex>, text: &str, with: &str) -> String {
    match pattern {
        Some(re) => re.replace_all(text, with).into_owned(),
        None => text.to_string(),
    }
}

/// Clean an XCCDF rule description
pub(crate) fn clean_xccdf_description(raw: &str) -> String {
    let patterns = patterns();
    let mut text = replace_all(patterns.wrapper.as_ref(), raw, "");
    for pattern in &patterns.subsections {
        text = replace_all(Some(pattern), &text, "");
    }
    collapse_tags(&text)
}

/// Clean a CKL `Vuln_Discuss` value
pub(crate) fn clean_ckl_description(raw: &str) -> String {
    let text = replace_all(patterns().wrapper.as_ref(), raw, "");
    collapse_tags(&text)
}

/// Replace remaining tags with spaces, then collapse whitespace runs
fn collapse_tags(text: &str) -> String {
    let spaced = replace_all(patterns().tag.as_ref(), text, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
