//! Outbound converters: CKL checklists and POAM reports

mod ckl;
mod poam;

pub use ckl::export_ckl;
pub use poam::{export_poam_csv, export_poam_json, is_poam_finding, PoamEntry, POAM_HEADERS};

use crate::model::Stig;

/// Download name for a CKL export: non-alphanumerics in the title become `_`
pub fn ckl_file_name(stig: &Stig) -> String {
    let stem: String = stig
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.ckl", stem)
}
