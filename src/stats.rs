//! Review progress statistics and rule filtering

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Rule, Severity, Status, Stig};

/// Review progress of one checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistStats {
    /// Number of rules
    pub total: usize,
    /// Rule count per category; every category is present
    pub by_severity: BTreeMap<Severity, usize>,
    /// Rule count per status; every status is present
    pub by_status: BTreeMap<Status, usize>,
    /// Rules with any status other than not reviewed
    pub evaluated: usize,
    /// `evaluated / total` as a rounded percentage, 0 for an empty checklist
    pub percent_complete: u32,
}

impl ChecklistStats {
    pub fn from_stig(stig: &Stig) -> Self {
        let mut by_severity: BTreeMap<Severity, usize> =
            Severity::ALL.into_iter().map(|s| (s, 0)).collect();
        let mut by_status: BTreeMap<Status, usize> =
            Status::ALL.into_iter().map(|s| (s, 0)).collect();

        for rule in &stig.rules {
            *by_severity.entry(rule.severity).or_default() += 1;
            *by_status.entry(rule.status).or_default() += 1;
        }

        let total = stig.rules.len();
        let not_reviewed = by_status.get(&Status::NotReviewed).copied().unwrap_or(0);
        let evaluated = total - not_reviewed;
        let percent_complete = if total == 0 {
            0
        } else {
            (evaluated as f64 / total as f64 * 100.0).round() as u32
        };

        Self {
            total,
            by_severity,
            by_status,
            evaluated,
            percent_complete,
        }
    }

    pub fn severity_count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    pub fn status_count(&self, status: Status) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

impl std::fmt::Display for ChecklistStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Checklist Statistics")?;
        writeln!(f, "====================")?;
        writeln!(f, "Total Rules:        {}", self.total)?;
        for severity in Severity::ALL {
            writeln!(f, "  {:<18}{}", format!("{}:", severity), self.severity_count(severity))?;
        }
        for status in Status::ALL {
            writeln!(f, "{:<20}{}", format!("{}:", status), self.status_count(status))?;
        }
        writeln!(
            f,
            "Evaluated:          {}/{} ({}%)",
            self.evaluated, self.total, self.percent_complete
        )?;
        Ok(())
    }
}

/// Rule selection by severity, status and free-text search.
///
/// Unset criteria match everything. The search term is matched
/// case-insensitively against title, vulnerability id, rule id,
/// description, check text and fix text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    pub severity: Option<Severity>,
    pub status: Option<Status>,
    pub search: Option<String>,
}

impl RuleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn matches(&self, rule: &Rule) -> bool {
        if self.severity.is_some_and(|s| s != rule.severity) {
            return false;
        }
        if self.status.is_some_and(|s| s != rule.status) {
            return false;
        }
        match self.search.as_deref() {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [
                    &rule.title,
                    &rule.stig_id,
                    &rule.id,
                    &rule.description,
                    &rule.check_text,
                    &rule.fix_text,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }

    /// Matching rules of `stig`, in document order
    pub fn apply<'a>(&self, stig: &'a Stig) -> Vec<&'a Rule> {
        stig.rules.iter().filter(|r| self.matches(r)).collect()
    }
}
