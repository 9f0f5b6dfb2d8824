//! Driving-index selection.
//!
//! Three tiers, tried in order for each indexed path: (1) an `$eq`/`$in`
//! clause on that path resolves to a union of id-sets directly; (2) a
//! range clause (`$gt`/`$gte`/`$lt`/`$lte`) on that path resolves to a
//! union over a sorted sub-range; (3) nothing indexed applies, so the
//! caller must fall back to a full collection scan.
//!
//! When more than one indexed path qualifies for tier 1, the one with the
//! smaller candidate set is chosen as the driving index — narrowing the
//! scan set before the remaining filter clauses are applied document by
//! document.

use std::collections::BTreeSet;

use crate::value::{Document, Value};

use super::{Bound, IndexDescriptor, IndexStore};

/// The outcome of planning: either a full scan, or a driving index that
/// narrows the candidate set before the remaining filter is re-checked in
/// full against each candidate document.
#[derive(Debug, PartialEq)]
pub enum Plan {
    FullScan,
    Indexed {
        index_name: String,
        candidate_ids: BTreeSet<String>,
    },
}

enum ClauseKind {
    Eq(Value),
    In(Vec<Value>),
    Range { lo: RangeBound, hi: RangeBound },
    Unusable,
}

#[derive(Clone)]
enum RangeBound {
    Unbounded,
    Inclusive(Value),
    Exclusive(Value),
}

impl From<RangeBound> for Bound {
    fn from(b: RangeBound) -> Bound {
        match b {
            RangeBound::Unbounded => Bound::Unbounded,
            RangeBound::Inclusive(v) => Bound::Inclusive(v),
            RangeBound::Exclusive(v) => Bound::Exclusive(v),
        }
    }
}

fn looks_like_operator_doc(doc: &Document) -> bool {
    doc.keys().next().map(|k| k.starts_with('$')).unwrap_or(false)
}

fn classify(clause: &Value) -> ClauseKind {
    let ops = match clause {
        Value::Document(ops) if looks_like_operator_doc(ops) => ops,
        scalar => return ClauseKind::Eq(scalar.clone()),
    };

    let mut lo = RangeBound::Unbounded;
    let mut hi = RangeBound::Unbounded;
    let mut has_range = false;

    for (op, operand) in ops.iter() {
        match op.as_str() {
            "$eq" => return ClauseKind::Eq(operand.clone()),
            "$in" => {
                return match operand {
                    Value::Array(items) => ClauseKind::In(items.clone()),
                    _ => ClauseKind::Unusable,
                }
            }
            "$gt" => {
                lo = RangeBound::Exclusive(operand.clone());
                has_range = true;
            }
            "$gte" => {
                lo = RangeBound::Inclusive(operand.clone());
                has_range = true;
            }
            "$lt" => {
                hi = RangeBound::Exclusive(operand.clone());
                has_range = true;
            }
            "$lte" => {
                hi = RangeBound::Inclusive(operand.clone());
                has_range = true;
            }
            // $ne/$nin don't narrow a scan (they widen it), so they can't
            // drive an index and don't disqualify one either: skip.
            "$ne" | "$nin" => continue,
            _ => return ClauseKind::Unusable,
        }
    }

    if has_range {
        ClauseKind::Range { lo, hi }
    } else {
        ClauseKind::Unusable
    }
}

/// Choose a driving index for `filter` out of `indexes`, each paired with
/// its live [IndexStore]. Returns [Plan::FullScan] if no indexed path has
/// an eq/in/range clause.
pub fn plan(filter: &Document, indexes: &[(IndexDescriptor, &IndexStore)]) -> Plan {
    let mut best: Option<(String, BTreeSet<String>)> = None;

    for (descriptor, store) in indexes {
        let clause = match filter.get(&descriptor.key_path) {
            Some(clause) => clause,
            None => continue,
        };

        let candidates = match classify(clause) {
            ClauseKind::Eq(value) => Some(store.eq_ids(&value)),
            ClauseKind::In(values) => Some(store.in_ids(&values)),
            ClauseKind::Range { .. } => None,
            ClauseKind::Unusable => None,
        };

        if let Some(candidates) = candidates {
            let better = match &best {
                Some((_, existing)) => candidates.len() < existing.len(),
                None => true,
            };
            if better {
                best = Some((descriptor.name.clone(), candidates));
            }
        }
    }

    if let Some((index_name, candidate_ids)) = best {
        return Plan::Indexed {
            index_name,
            candidate_ids,
        };
    }

    // Tier 2: no eq/in hit, fall back to a range clause on any indexed path.
    for (descriptor, store) in indexes {
        let clause = match filter.get(&descriptor.key_path) {
            Some(clause) => clause,
            None => continue,
        };
        if let ClauseKind::Range { lo, hi } = classify(clause) {
            let candidate_ids = store.range_ids(lo.into(), hi.into());
            return Plan::Indexed {
                index_name: descriptor.name.clone(),
                candidate_ids,
            };
        }
    }

    Plan::FullScan
}

#[cfg(test)]
#[path = "planner_test.rs"]
mod planner_test;
