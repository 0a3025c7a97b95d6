//! Document-number propagation.
//!
//! Journal lines that belong to the same document must agree on their tax flags. When any
//! line of a document is posted to an account tagged with a flag, every line of that
//! document carries the flag's canonical value. Labels (koreksi/obyek) stay row-local.

use std::collections::BTreeMap;

use crate::models::{ClassifiedRow, Side, TaxFlag};
use crate::rules::RuleSet;

/// One bucket write produced by the pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketUpdate {
    pub row_id: i64,
    pub flag: TaxFlag,
    pub value: f64,
}

fn candidate(row: &ClassifiedRow, flag: TaxFlag) -> Option<f64> {
    if let Some(v) = row.derived.buckets.get(flag).filter(|v| *v != 0.0) {
        return Some(v);
    }
    let raw = match flag.side() {
        Side::Credit => row.row.credit,
        Side::Debit => row.row.debit,
    };
    (raw > 0.0).then_some(raw)
}

/// Canonical value of `flag` for one document: the first tagged row, by ascending id,
/// that yields a candidate wins.
fn canonical(group: &[&ClassifiedRow], flag: TaxFlag, rules: &RuleSet) -> Option<f64> {
    group
        .iter()
        .filter(|r| rules.account_tag(&r.row.account_code) == Some(flag))
        .find_map(|r| candidate(r, flag))
}

/// Compute the writes that make every document consistent. Only rows whose stored value
/// differs from the canonical one get an update, so a second pass returns nothing.
pub fn propagate(rows: &[ClassifiedRow], rules: &RuleSet) -> Vec<BucketUpdate> {
    let mut groups: BTreeMap<&str, Vec<&ClassifiedRow>> = BTreeMap::new();
    for row in rows {
        let doc = row.row.document_number.as_str();
        if doc.is_empty() {
            continue;
        }
        groups.entry(doc).or_default().push(row);
    }

    let mut updates = Vec::new();
    for group in groups.values_mut() {
        group.sort_by_key(|r| r.row.id);
        for flag in TaxFlag::ALL {
            let Some(value) = canonical(group, flag, rules) else {
                continue;
            };
            for row in group.iter() {
                if row.derived.buckets.get(flag) != Some(value) {
                    updates.push(BucketUpdate {
                        row_id: row.row.id,
                        flag,
                        value,
                    });
                }
            }
        }
    }
    updates
}
