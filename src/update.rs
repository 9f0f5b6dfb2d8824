//! The update executor: path-addressed in-place mutation of a document
//! copy, with `$set` / `$inc` / `$push`.
//!
//! Callers always hand us an owned [Document] clone — this module never
//! sees the stored original, which is how the crate upholds copy
//! isolation between the caller's view and the stored document (§9).

use crate::{
    err_at, path,
    value::{Document, Value},
    Error, Result,
};

/// Apply `update` (a document of `{$op: {path: value, ...}, ...}`) to
/// `doc` in place. Returns `INVALID_ARGUMENT` for an unrecognized `$op`,
/// `INVALID_UPDATE` for a type mismatch the named operator can't resolve.
pub fn apply(doc: &mut Document, update: &Document) -> Result<()> {
    for (op, fields) in update.iter() {
        let fields = match fields {
            Value::Document(f) => f,
            _ => {
                return err_at!(
                    InvalidArgument,
                    msg: "update operator {} must map to a document of paths", op
                )
            }
        };
        match op.as_str() {
            "$set" => {
                for (p, v) in fields.iter() {
                    set(doc, p, v.clone())?;
                }
            }
            "$inc" => {
                for (p, delta) in fields.iter() {
                    inc(doc, p, delta)?;
                }
            }
            "$push" => {
                for (p, v) in fields.iter() {
                    push(doc, p, v.clone())?;
                }
            }
            other => {
                return err_at!(InvalidArgument, msg: "unknown update operator {}", other)
            }
        }
    }
    Ok(())
}

fn set(doc: &mut Document, dotted_path: &str, value: Value) -> Result<()> {
    let slot = path::get_or_create_mut(doc, dotted_path).ok_or_else(|| {
        Error::InvalidUpdate(format!(
            "$set: {} traverses a non-container intermediate value",
            dotted_path
        ))
    })?;
    *slot = value;
    Ok(())
}

fn inc(doc: &mut Document, dotted_path: &str, delta: &Value) -> Result<()> {
    let delta_f = as_number(delta).ok_or_else(|| {
        Error::InvalidUpdate(format!("$inc: delta at {} is not numeric", dotted_path))
    })?;
    let slot = path::get_or_create_mut(doc, dotted_path).ok_or_else(|| {
        Error::InvalidUpdate(format!(
            "$inc: {} traverses a non-container intermediate value",
            dotted_path
        ))
    })?;
    *slot = match slot {
        Value::Null => delta.clone(),
        existing => {
            let existing_f = as_number(existing).ok_or_else(|| {
                Error::InvalidUpdate(format!(
                    "$inc: existing value at {} is not numeric",
                    dotted_path
                ))
            })?;
            match (&*existing, delta) {
                (Value::Int(a), Value::Int(b)) => Value::Int(a + b),
                _ => Value::Float(existing_f + delta_f),
            }
        }
    };
    Ok(())
}

fn push(doc: &mut Document, dotted_path: &str, value: Value) -> Result<()> {
    let slot = path::get_or_create_mut(doc, dotted_path).ok_or_else(|| {
        Error::InvalidUpdate(format!(
            "$push: {} traverses a non-container intermediate value",
            dotted_path
        ))
    })?;
    match slot {
        Value::Null => *slot = Value::Array(vec![value]),
        Value::Array(items) => items.push(value),
        _ => {
            return err_at!(
                InvalidUpdate,
                msg: "$push: existing value at {} is not a sequence", dotted_path
            )
        }
    }
    Ok(())
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

#[cfg(test)]
#[path = "update_test.rs"]
mod update_test;
