//! # stigview
//!
//! DISA STIG checklist core: one canonical model and the converters around it.
//!
//! ## Features
//!
//! - **XCCDF import**: DISA benchmark XML, namespaced or not, to a [`Stig`]
//! - **CKL import/export**: STIG Viewer checklist files, round-trip safe
//! - **POAM export**: 16-column Plan of Action and Milestones as CSV or JSON,
//!   with CCI references resolved to SP 800-53 controls through a [`CciMap`]
//! - **Version diff**: added, removed and changed rules between two releases
//! - **Library bundles** (`library` feature): XCCDF extraction from DISA ZIPs
//!
//! ## Quick Start
//!
//! ```ignore
//! use stigview::{diff_stigs, export_ckl, export_poam_csv, parse_xccdf, AssetInfo, CciMap};
//!
//! let baseline = parse_xccdf(&std::fs::read_to_string("U_RHEL_9_V2R1_Manual-xccdf.xml")?)?;
//! let current = parse_xccdf(&std::fs::read_to_string("U_RHEL_9_V2R2_Manual-xccdf.xml")?)?;
//!
//! let diff = diff_stigs(&baseline, &current);
//! println!("{} added, {} changed", diff.added.len(), diff.changed.len());
//!
//! let asset = AssetInfo::new("web01", "10.0.0.5", "", "web01.example.mil");
//! let ckl = export_ckl(&current, &asset);
//! let poam = export_poam_csv(&current, &asset, &CciMap::builtin(), false);
//! ```
//!
//! All converters are synchronous pure functions over immutable values and
//! emit `tracing` events only; installing a subscriber is left to the caller.

mod cci;
mod diff;
mod error;
mod export;
mod model;
mod parse;
mod stats;
mod xml;

#[cfg(feature = "library")]
pub mod library;

// Re-exports
pub use cci::{CciMap, CciMapping};
pub use diff::{diff_stigs, ChangedRule, DiffField, DiffResult, RuleFields, DIFF_FIELDS};
pub use error::{CciMapError, LoadError, ParseError, Result};
pub use export::{
    ckl_file_name, export_ckl, export_poam_csv, export_poam_json, is_poam_finding, PoamEntry,
    POAM_HEADERS,
};
pub use model::{AssetInfo, Rule, RuleUpdate, Severity, Status, Stig};
pub use parse::{load_checklist, parse_ckl, parse_document, parse_xccdf, DocumentKind};
pub use stats::{ChecklistStats, RuleFilter};

#[cfg(feature = "library")]
pub use error::LibraryError;
#[cfg(feature = "library")]
pub use library::{extract_all_from_library, extract_xccdf_from_zip, LibraryEntry, LibraryFailure};
