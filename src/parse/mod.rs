//! Inbound converters: XCCDF benchmarks and CKL checklists to [`Stig`]
//!
//! Both parsers are best-effort field extractors. Missing optional fields
//! resolve to empty strings, empty CCI lists, `CAT II` and `not_reviewed`.
//! Only XCCDF input can fail: malformed XML, or no `Benchmark` element.

mod ckl;
mod clean;
mod xccdf;

use std::path::Path;

use tracing::debug;

use crate::error::{LoadError, Result};
use crate::model::Stig;
use crate::xml::Element;

pub use ckl::parse_ckl;
pub use xccdf::parse_xccdf;

/// Inbound document dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Xccdf,
    Ckl,
}

impl DocumentKind {
    /// `.ckl` files are checklists; everything else is treated as XCCDF.
    ///
    /// The match is case-sensitive, so `HOST.CKL` is read as XCCDF.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".ckl") {
            Self::Ckl
        } else {
            Self::Xccdf
        }
    }
}

/// Parse `text` with the parser for `kind`
pub fn parse_document(kind: DocumentKind, text: &str) -> Result<Stig> {
    match kind {
        DocumentKind::Xccdf => parse_xccdf(text),
        DocumentKind::Ckl => parse_ckl(text),
    }
}

/// Read a checklist file and parse it according to its extension.
///
/// `.json` files hold the serialized model (see [`Stig::to_json`]); other
/// names go through [`DocumentKind::from_file_name`].
pub fn load_checklist(path: impl AsRef<Path>) -> std::result::Result<Stig, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    if name.ends_with(".json") {
        debug!(path = %path.display(), "Loading checklist JSON");
        return Ok(Stig::from_json(&text)?);
    }

    let kind = DocumentKind::from_file_name(&name);
    debug!(path = %path.display(), ?kind, "Loading checklist");

    parse_document(kind, &text).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Trimmed text of the first candidate tag that yields non-empty text.
///
/// Candidates are tried in order; each one uses the qualified-then-wildcard
/// lookup of [`Element::find`].
pub(crate) fn first_text(el: &Element, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| el.find(name))
        .map(|found| found.text_content().trim().to_string())
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::xml::Document;
    use std::io::Write;

    #[test]
    fn test_document_kind_from_file_name() {
        assert_eq!(DocumentKind::from_file_name("web01.ckl"), DocumentKind::Ckl);
        assert_eq!(
            DocumentKind::from_file_name("U_RHEL_8_V1R13_Manual-xccdf.xml"),
            DocumentKind::Xccdf
        );
        assert_eq!(DocumentKind::from_file_name("notes.txt"), DocumentKind::Xccdf);
        assert_eq!(DocumentKind::from_file_name("HOST.CKL"), DocumentKind::Xccdf);
    }

    #[test]
    fn test_first_text_skips_empty_candidates() {
        let doc = Document::parse("<r><title>  </title><Title>Caps</Title></r>").unwrap();
        assert_eq!(first_text(doc.root(), &["title", "Title"]).as_deref(), Some("Caps"));
        assert_eq!(first_text(doc.root(), &["missing"]), None);
    }

    #[test]
    fn test_load_checklist_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let ckl_path = dir.path().join("host.ckl");
        let mut file = std::fs::File::create(&ckl_path).unwrap();
        write!(file, "<CHECKLIST><STIGS><iSTIG><VULN><STATUS>Open</STATUS></VULN></iSTIG></STIGS></CHECKLIST>").unwrap();
        let stig = load_checklist(&ckl_path).unwrap();
        assert_eq!(stig.title, "Imported Checklist");
        assert_eq!(stig.rules.len(), 1);

        // Same text as XCCDF has no Benchmark
        let xml_path = dir.path().join("host.xml");
        std::fs::copy(&ckl_path, &xml_path).unwrap();
        match load_checklist(&xml_path) {
            Err(LoadError::Parse { source, .. }) => assert_eq!(source, ParseError::NoBenchmark),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_checklist_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rhel-9.json");
        std::fs::write(&path, r#"{"title": "RHEL 9", "rules": [{"id": "r1", "stigId": "V-1"}]}"#).unwrap();
        let stig = load_checklist(&path).unwrap();
        assert_eq!(stig.title, "RHEL 9");
        assert_eq!(stig.rules[0].stig_id, "V-1");

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_checklist(&path), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_load_checklist_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_checklist(dir.path().join("absent.ckl")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
