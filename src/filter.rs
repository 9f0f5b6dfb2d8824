//! The document query evaluator.
//!
//! A filter is itself a [Document]: top-level keys combine with logical
//! AND; each key is a dotted path; each value is either a scalar (implicit
//! `$eq`) or an operator document mapping operator tags to operands.
//! Type mismatches between an operand and the path's actual value are
//! never errors — they resolve through [Value]'s total order.

use crate::{
    err_at, path,
    value::{Document, Value},
    Error, Result,
};

/// Evaluate `filter` against `doc`. Unknown operators raise
/// `INVALID_ARGUMENT`; everything else returns a boolean verdict.
pub fn matches(filter: &Document, doc: &Document) -> Result<bool> {
    for (dotted_path, clause) in filter.iter() {
        if !eval_clause(doc, dotted_path, clause)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn eval_clause(doc: &Document, dotted_path: &str, clause: &Value) -> Result<bool> {
    let found = path::get(doc, dotted_path);
    match clause {
        Value::Document(ops) if looks_like_operator_doc(ops) => {
            eval_operators(found, ops)
        }
        scalar => Ok(eq(found, scalar)),
    }
}

/// An operator document has keys starting with `$`; a plain nested
/// document filter value (matched by deep equality) does not.
fn looks_like_operator_doc(doc: &Document) -> bool {
    doc.keys().next().map(|k| k.starts_with('$')).unwrap_or(false)
}

fn eval_operators(found: Option<&Value>, ops: &Document) -> Result<bool> {
    for (op, operand) in ops.iter() {
        let ok = match op.as_str() {
            "$eq" => eq(found, operand),
            "$ne" => !eq(found, operand),
            "$gt" => cmp_op(found, operand, |o| o.is_gt()),
            "$gte" => cmp_op(found, operand, |o| o.is_ge()),
            "$lt" => cmp_op(found, operand, |o| o.is_lt()),
            "$lte" => cmp_op(found, operand, |o| o.is_le()),
            "$in" => {
                let list = as_array(operand)?;
                list.iter().any(|v| eq(found, v))
            }
            "$nin" => {
                let list = as_array(operand)?;
                !list.iter().any(|v| eq(found, v))
            }
            other => {
                return err_at!(InvalidArgument, msg: "unknown filter operator {}", other)
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn as_array(v: &Value) -> Result<&[Value]> {
    match v {
        Value::Array(items) => Ok(items),
        _ => err_at!(InvalidArgument, msg: "$in/$nin operand must be an array"),
    }
}

/// `$eq` semantics: direct value equality, or in-list equality when the
/// path value is a sequence containing an element equal to the operand.
/// Missing path (`found == None`) matches only `$eq: null`.
fn eq(found: Option<&Value>, operand: &Value) -> bool {
    match found {
        None => operand.is_null(),
        Some(v) => v == operand || v.contains(operand),
    }
}

/// Range operators never match a missing path, and ignore in-list
/// equality — they compare the path value itself against the operand.
fn cmp_op(
    found: Option<&Value>,
    operand: &Value,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> bool {
    match found {
        None => false,
        Some(v) => accept(v.cmp(operand)),
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod filter_test;
