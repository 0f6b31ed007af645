//! Content diff between two versions of a STIG
//!
//! Rules are matched by `stig_id`. Only authoring content is compared
//! (title, severity, description, check and fix text); review state such as
//! status, comments and CCI references never produces a change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Rule, Severity, Stig};

/// A compared rule field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiffField {
    Title,
    Severity,
    Description,
    CheckText,
    FixText,
}

/// Fields compared by [`diff_stigs`], in reporting order
pub const DIFF_FIELDS: [DiffField; 5] = [
    DiffField::Title,
    DiffField::Severity,
    DiffField::Description,
    DiffField::CheckText,
    DiffField::FixText,
];

impl DiffField {
    /// Key used in JSON output (`checkText`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Severity => "severity",
            Self::Description => "description",
            Self::CheckText => "checkText",
            Self::FixText => "fixText",
        }
    }

    fn differs(&self, a: &Rule, b: &Rule) -> bool {
        match self {
            Self::Title => a.title != b.title,
            Self::Severity => a.severity != b.severity,
            Self::Description => a.description != b.description,
            Self::CheckText => a.check_text != b.check_text,
            Self::FixText => a.fix_text != b.fix_text,
        }
    }
}

impl std::fmt::Display for DiffField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values of the differing fields on one side of a change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_text: Option<String>,
}

impl RuleFields {
    fn capture(rule: &Rule, fields: &[DiffField]) -> Self {
        let mut out = Self::default();
        for field in fields {
            match field {
                DiffField::Title => out.title = Some(rule.title.clone()),
                DiffField::Severity => out.severity = Some(rule.severity),
                DiffField::Description => out.description = Some(rule.description.clone()),
                DiffField::CheckText => out.check_text = Some(rule.check_text.clone()),
                DiffField::FixText => out.fix_text = Some(rule.fix_text.clone()),
            }
        }
        out
    }
}

/// A rule present in both versions whose content differs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedRule {
    pub stig_id: String,
    /// Rule id from the baseline version
    pub rule_id: String,
    /// Never empty
    pub fields: Vec<DiffField>,
    pub a: RuleFields,
    pub b: RuleFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub added: Vec<Rule>,
    pub removed: Vec<Rule>,
    pub changed: Vec<ChangedRule>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Rules keyed by `stig_id`, iterated in first-insertion order.
///
/// A repeated key keeps the position of its first occurrence and the value
/// of its last.
struct RuleIndex<'a> {
    order: Vec<&'a str>,
    rules: HashMap<&'a str, &'a Rule>,
}

impl<'a> RuleIndex<'a> {
    fn new(rules: &'a [Rule]) -> Self {
        let mut index = Self {
            order: Vec::with_capacity(rules.len()),
            rules: HashMap::with_capacity(rules.len()),
        };
        for rule in rules {
            if index.rules.insert(&rule.stig_id, rule).is_none() {
                index.order.push(&rule.stig_id);
            }
        }
        index
    }

    fn get(&self, stig_id: &str) -> Option<&'a Rule> {
        self.rules.get(stig_id).copied()
    }

    fn contains(&self, stig_id: &str) -> bool {
        self.rules.contains_key(stig_id)
    }

    fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Rule)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.get(id).map(|rule| (*id, rule)))
    }
}

/// Compare baseline `a` against `b`.
///
/// `added` follows the rule order of `b`; `removed` and `changed` follow the
/// rule order of `a`.
pub fn diff_stigs(a: &Stig, b: &Stig) -> DiffResult {
    let index_a = RuleIndex::new(&a.rules);
    let index_b = RuleIndex::new(&b.rules);
    let mut result = DiffResult::default();

    result.added = index_b
        .iter()
        .filter(|(id, _)| !index_a.contains(id))
        .map(|(_, rule)| rule.clone())
        .collect();

    for (id, rule_a) in index_a.iter() {
        let Some(rule_b) = index_b.get(id) else {
            result.removed.push(rule_a.clone());
            continue;
        };

        let fields: Vec<DiffField> = DIFF_FIELDS
            .into_iter()
            .filter(|f| f.differs(rule_a, rule_b))
            .collect();
        if fields.is_empty() {
            continue;
        }

        result.changed.push(ChangedRule {
            stig_id: id.to_string(),
            rule_id: rule_a.id.clone(),
            a: RuleFields::capture(rule_a, &fields),
            b: RuleFields::capture(rule_b, &fields),
            fields,
        });
    }

    debug!(
        added = result.added.len(),
        removed = result.removed.len(),
        changed = result.changed.len(),
        "Compared STIG versions"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use std::collections::HashSet;

    fn rule(stig_id: &str) -> Rule {
        Rule {
            id: format!("SV-{}r1_rule", stig_id),
            stig_id: stig_id.to_string(),
            title: format!("Title {}", stig_id),
            description: "Description".into(),
            check_text: "Check".into(),
            fix_text: "Fix".into(),
            ..Default::default()
        }
    }

    fn stig(rules: Vec<Rule>) -> Stig {
        Stig {
            title: "Demo".into(),
            rules,
            ..Default::default()
        }
    }

    fn ids(rules: &[Rule]) -> Vec<&str> {
        rules.iter().map(|r| r.stig_id.as_str()).collect()
    }

    #[test]
    fn test_single_fix_text_change() {
        let a = stig(vec![rule("V-1"), rule("V-2")]);
        let b = stig(vec![
            rule("V-1"),
            Rule {
                fix_text: "New fix".into(),
                ..rule("V-2")
            },
        ]);

        let diff = diff_stigs(&a, &b);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.changed.len(), 1);

        let change = &diff.changed[0];
        assert_eq!(change.stig_id, "V-2");
        assert_eq!(change.rule_id, "SV-V-2r1_rule");
        assert_eq!(change.fields, vec![DiffField::FixText]);
        assert_eq!(change.a.fix_text.as_deref(), Some("Fix"));
        assert_eq!(change.b.fix_text.as_deref(), Some("New fix"));
        assert_eq!(change.a.title, None);

        let json = serde_json::to_value(change).unwrap();
        assert_eq!(json["fields"], serde_json::json!(["fixText"]));
        assert_eq!(json["a"], serde_json::json!({"fixText": "Fix"}));
        assert_eq!(json["ruleId"], "SV-V-2r1_rule");
    }

    #[test]
    fn test_added_and_removed_order() {
        let a = stig(vec![rule("V-3"), rule("V-1"), rule("V-2")]);
        let b = stig(vec![rule("V-5"), rule("V-1"), rule("V-4")]);

        let diff = diff_stigs(&a, &b);
        assert_eq!(ids(&diff.added), vec!["V-5", "V-4"]);
        assert_eq!(ids(&diff.removed), vec!["V-3", "V-2"]);
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn test_added_removed_symmetry() {
        let a = stig(vec![rule("V-1"), rule("V-2"), rule("V-3")]);
        let b = stig(vec![rule("V-2"), rule("V-4")]);

        let ab = diff_stigs(&a, &b);
        let ba = diff_stigs(&b, &a);
        let set = |rules: &[Rule]| rules.iter().map(|r| r.stig_id.clone()).collect::<HashSet<_>>();
        assert_eq!(set(&ab.added), set(&ba.removed));
        assert_eq!(set(&ab.removed), set(&ba.added));
    }

    #[test]
    fn test_review_state_is_ignored() {
        let a = stig(vec![rule("V-1")]);
        let b = stig(vec![Rule {
            id: "SV-V-1r2_rule".into(),
            group_id: "SRG-OS-000001".into(),
            status: Status::Open,
            comments: "reviewed".into(),
            finding_details: "details".into(),
            cci_ids: vec!["CCI-000366".into()],
            ..rule("V-1")
        }]);
        assert!(diff_stigs(&a, &b).is_empty());
    }

    #[test]
    fn test_changed_fields_are_minimal_and_ordered() {
        let a = stig(vec![rule("V-1")]);
        let b = stig(vec![Rule {
            severity: Severity::CatI,
            check_text: "New check".into(),
            title: "New title".into(),
            ..rule("V-1")
        }]);

        let diff = diff_stigs(&a, &b);
        let change = &diff.changed[0];
        assert_eq!(
            change.fields,
            vec![DiffField::Title, DiffField::Severity, DiffField::CheckText]
        );
        assert_eq!(change.a.severity, Some(Severity::CatII));
        assert_eq!(change.b.severity, Some(Severity::CatI));
        assert_eq!(change.b.description, None);
        assert!(change.fields.iter().all(|f| DIFF_FIELDS.contains(f)));
    }

    #[test]
    fn test_duplicate_stig_ids_keep_first_position_last_value() {
        let a = stig(vec![
            Rule {
                title: "first".into(),
                ..rule("V-1")
            },
            rule("V-2"),
            Rule {
                title: "last".into(),
                ..rule("V-1")
            },
        ]);
        let b = stig(vec![rule("V-9")]);

        let diff = diff_stigs(&a, &b);
        assert_eq!(ids(&diff.removed), vec!["V-1", "V-2"]);
        assert_eq!(diff.removed[0].title, "last");
    }

    #[test]
    fn test_identical_inputs() {
        let a = stig(vec![rule("V-1"), rule("V-2")]);
        let diff = diff_stigs(&a, &a.clone());
        assert!(diff.is_empty());
    }
}
