//! DISA STIG library bundles
//!
//! DISA publishes each STIG as a ZIP (often a ZIP inside a ZIP) and ships
//! quarterly library bundles that contain hundreds of those. This module
//! locates the XCCDF benchmark inside a STIG archive and bulk-converts a
//! whole bundle, collecting failures per entry instead of aborting.

use std::io::{Cursor, Read};

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::LibraryError;
use crate::model::Stig;
use crate::parse::parse_xccdf;

/// Catalog name used for a failure to open the bundle itself
pub const OUTER_ARCHIVE: &str = "(outer zip)";

/// One converted STIG from a library bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryEntry {
    /// Slug derived from the archive name, see [`filename_to_id`]
    pub id: String,
    pub category: &'static str,
    pub stig: Stig,
}

/// A bundle entry that could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryFailure {
    pub id: String,
    pub message: String,
}

impl LibraryFailure {
    fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Text of the first `*_xccdf.xml` / `*-xccdf.xml` entry in a STIG archive.
///
/// Nested `.zip` entries are searched in archive order; a nested archive
/// that is unreadable or has no benchmark is skipped.
pub fn extract_xccdf_from_zip(zip_bytes: &[u8]) -> Result<String, LibraryError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(zip_bytes))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_lowercase();

        if name.ends_with("_xccdf.xml") || name.ends_with("-xccdf.xml") {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            debug!(entry = %file.name(), bytes = content.len(), "Found XCCDF entry");
            return Ok(content);
        }

        if name.ends_with(".zip") {
            let mut inner = Vec::new();
            file.read_to_end(&mut inner)?;
            match extract_xccdf_from_zip(&inner) {
                Ok(xccdf) => return Ok(xccdf),
                Err(e) => trace!(entry = %name, error = %e, "Nested archive has no XCCDF"),
            }
        }
    }

    Err(LibraryError::NoXccdf)
}

/// Stable catalog id for a DISA archive name.
///
/// `U_MS_Windows_11_V2R3_STIG.zip` becomes `ms-windows-11`. A trailing
/// `_V<digit>` is cut as well, and non-ASCII letters act as separators.
pub fn filename_to_id(zip_name: &str) -> String {
    let base = zip_name.rsplit('/').next().unwrap_or(zip_name);
    let base = base
        .strip_suffix(".zip")
        .or_else(|| base.strip_suffix(".ZIP"))
        .unwrap_or(base);
    let base = base.strip_prefix("U_").unwrap_or(base);
    let base = base.strip_suffix("_STIG").unwrap_or(base);
    let base = strip_version_marker(base);

    let mut slug = String::with_capacity(base.len());
    for c in base.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Cut at the last `_V<digit>` marker, e.g. `_V2R3`
fn strip_version_marker(base: &str) -> &str {
    let bytes = base.as_bytes();
    let cut = base
        .match_indices("_V")
        .map(|(i, _)| i)
        .filter(|&i| bytes.get(i + 2).is_some_and(u8::is_ascii_digit))
        .last();
    match cut {
        Some(i) => &base[..i],
        None => base,
    }
}

/// Catalog category inferred from a benchmark title
pub fn infer_category(title: &str) -> &'static str {
    const LINUX: [&str; 8] = [
        "red hat", "rhel", "ubuntu", "linux", "debian", "suse", "alma", "rocky",
    ];
    const BROWSER: [&str; 5] = ["chrome", "firefox", "edge", "safari", "browser"];

    let title = title.to_lowercase();
    if title.contains("windows") {
        "Windows"
    } else if LINUX.iter().any(|k| title.contains(k)) {
        "Linux"
    } else if BROWSER.iter().any(|k| title.contains(k)) {
        "Browser"
    } else {
        "Network"
    }
}

/// Convert every `*_STIG.zip` in a library bundle.
///
/// Other entries (SRGs, manifests, READMEs) are skipped. A bundle that
/// cannot be opened yields a single failure named [`OUTER_ARCHIVE`].
pub fn extract_all_from_library(library_bytes: &[u8]) -> (Vec<LibraryEntry>, Vec<LibraryFailure>) {
    let mut archive = match zip::ZipArchive::new(Cursor::new(library_bytes)) {
        Ok(archive) => archive,
        Err(e) => return (Vec::new(), vec![LibraryFailure::new(OUTER_ARCHIVE, e.to_string())]),
    };

    let mut entries = Vec::new();
    let mut failures = Vec::new();

    for i in 0..archive.len() {
        let (name, bytes) = {
            let mut file = match archive.by_index(i) {
                Ok(file) => file,
                Err(e) => {
                    trace!(index = i, error = %e, "Skipping unreadable bundle entry");
                    continue;
                }
            };
            let name = file.name().to_string();
            if !name.to_lowercase().ends_with("_stig.zip") {
                continue;
            }

            let mut bytes = Vec::new();
            if file.read_to_end(&mut bytes).is_err() {
                failures.push(LibraryFailure::new(filename_to_id(&name), "failed to read ZIP entry"));
                continue;
            }
            (name, bytes)
        };

        let id = filename_to_id(&name);
        match convert_entry(&bytes) {
            Ok(stig) => {
                let category = infer_category(&stig.title);
                debug!(id = %id, category, rules = stig.rules.len(), "Converted bundle entry");
                entries.push(LibraryEntry { id, category, stig });
            }
            Err(e) => {
                debug!(id = %id, error = %e, "Bundle entry failed");
                let message = match e {
                    LibraryError::Parse(_) => e.to_string(),
                    other => format!("ZIP extraction failed: {}", other),
                };
                failures.push(LibraryFailure::new(id, message));
            }
        }
    }

    (entries, failures)
}

fn convert_entry(bytes: &[u8]) -> Result<Stig, LibraryError> {
    let xccdf = extract_xccdf_from_zip(bytes)?;
    Ok(parse_xccdf(&xccdf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::CompressionMethod;

    const XCCDF: &str = r#"<Benchmark xmlns="http://checklists.nist.gov/xccdf/1.1">
  <title>Microsoft Windows 11 Security Technical Implementation Guide</title>
  <version>2</version>
  <Group id="V-253254"><Rule id="SV-253254r1_rule" severity="high"><title>T</title></Rule></Group>
</Benchmark>"#;

    fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_direct_entry() {
        let archive = zip_of(&[
            ("README.txt", b"readme"),
            ("U_MS_Windows_11_V2R3_Manual-xccdf.xml", XCCDF.as_bytes()),
        ]);
        assert_eq!(extract_xccdf_from_zip(&archive).unwrap(), XCCDF);
    }

    #[test]
    fn test_extract_nested_entry() {
        let inner = zip_of(&[("U_MS_Windows_11_STIG_V2R3_Manual_xccdf.xml", XCCDF.as_bytes())]);
        let outer = zip_of(&[
            ("broken.zip", b"not a zip"),
            ("U_MS_Windows_11_V2R3_STIG.zip", &inner),
        ]);
        assert_eq!(extract_xccdf_from_zip(&outer).unwrap(), XCCDF);
    }

    #[test]
    fn test_extract_without_xccdf() {
        let archive = zip_of(&[("notes.xml", b"<notes/>")]);
        assert!(matches!(extract_xccdf_from_zip(&archive), Err(LibraryError::NoXccdf)));
        assert!(matches!(extract_xccdf_from_zip(b"garbage"), Err(LibraryError::Zip(_))));
    }

    #[test]
    fn test_filename_to_id() {
        assert_eq!(filename_to_id("U_MS_Windows_11_V2R3_STIG.zip"), "ms-windows-11");
        assert_eq!(filename_to_id("U_RHEL_9_V2R2_STIG.zip"), "rhel-9");
        assert_eq!(filename_to_id("bundle/U_Google_Chrome_V2R9_STIG.ZIP"), "google-chrome");
        assert_eq!(filename_to_id("U_Cisco_IOS-XE__Router_NDM_V3R1_STIG.zip"), "cisco-ios-xe-router-ndm");
        assert_eq!(filename_to_id("Custom Baseline.zip"), "custom-baseline");
    }

    #[test]
    fn test_filename_to_id_edge_names() {
        assert_eq!(filename_to_id("U_Foo_V2.zip"), "foo");
        assert_eq!(filename_to_id("U_Foo_V2"), "foo");
        assert_eq!(filename_to_id("U_Foo_Vault_V1R1_STIG.zip"), "foo-vault");
        assert_eq!(
            filename_to_id("U_Système_Contrôle_V1R1_STIG.zip"),
            "syst-me-contr-le"
        );
    }

    #[test]
    fn test_infer_category() {
        assert_eq!(infer_category("Microsoft Windows Server 2022 STIG"), "Windows");
        assert_eq!(infer_category("Red Hat Enterprise Linux 9 STIG"), "Linux");
        assert_eq!(infer_category("Canonical Ubuntu 22.04 LTS STIG"), "Linux");
        assert_eq!(infer_category("Mozilla Firefox STIG"), "Browser");
        assert_eq!(infer_category("Cisco IOS XE Router NDM STIG"), "Network");
    }

    #[test]
    fn test_extract_all_from_library() {
        let good = zip_of(&[("U_MS_Windows_11_V2R3_Manual-xccdf.xml", XCCDF.as_bytes())]);
        let empty = zip_of(&[("README.txt", b"nothing here")]);
        let bad_xml = zip_of(&[("U_Broken_V1R1_Manual-xccdf.xml", b"<NotABenchmark/>")]);
        let bundle = zip_of(&[
            ("U_MS_Windows_11_V2R3_STIG.zip", &good),
            ("U_Empty_V1R1_STIG.zip", &empty),
            ("U_Broken_V1R1_STIG.zip", &bad_xml),
            ("U_General_Purpose_OS_V3R1_SRG.zip", &good),
            ("manifest.txt", b"skip me"),
        ]);

        let (entries, failures) = extract_all_from_library(&bundle);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "ms-windows-11");
        assert_eq!(entries[0].category, "Windows");
        assert_eq!(entries[0].stig.rules.len(), 1);

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].id, "empty");
        assert!(failures[0].message.starts_with("ZIP extraction failed: "));
        assert_eq!(failures[1].id, "broken");
        assert_eq!(failures[1].message, "XCCDF parse failed: No Benchmark element found in XCCDF");
    }

    #[test]
    fn test_unreadable_bundle() {
        let (entries, failures) = extract_all_from_library(b"definitely not a zip");
        assert!(entries.is_empty());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].id, OUTER_ARCHIVE);
    }
}
