//! Field exclusion for fetched tickets.
//!
//! Two passes run over every ticket: top-level keys named in
//! [`ExclusionSpec::global_keys`] are dropped, then each dotted path in
//! [`ExclusionSpec::field_paths`] is removed from the matching value under
//! the ticket's `fields` mapping. Missing keys, missing paths and type
//! mismatches are skipped silently.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, info};

use crate::ticket::{Ticket, FIELDS_KEY};

/// What to strip from each ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSpec {
    /// Keys removed from the top level of every ticket.
    pub global_keys: BTreeSet<String>,
    /// `fields` sub-key -> dotted paths removed inside its value.
    pub field_paths: BTreeMap<String, Vec<String>>,
}

impl ExclusionSpec {
    pub fn is_empty(&self) -> bool {
        self.global_keys.is_empty() && self.field_paths.values().all(Vec::is_empty)
    }
}

/// Result of a [`redact`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedactOutcome {
    /// Nothing is excluded; the batch was not touched.
    NothingToDo,
    /// Exclusions ran over `tickets` tickets and removed `removed` nodes.
    Applied { tickets: usize, removed: usize },
}

/// Strip excluded fields from every ticket in place.
pub fn redact(batch: &mut [Ticket], spec: &ExclusionSpec) -> RedactOutcome {
    if spec.is_empty() {
        info!("no field exclusions configured; nothing to do");
        return RedactOutcome::NothingToDo;
    }

    let mut removed = 0;
    for ticket in batch.iter_mut() {
        removed += redact_ticket(ticket, spec);
    }

    info!(tickets = batch.len(), removed, "applied field exclusions");
    RedactOutcome::Applied {
        tickets: batch.len(),
        removed,
    }
}

/// Apply both exclusion passes to one ticket, returning the number of
/// nodes removed.
pub fn redact_ticket(ticket: &mut Ticket, spec: &ExclusionSpec) -> usize {
    let Value::Object(record) = ticket else {
        debug!("skipping ticket that is not a JSON object");
        return 0;
    };

    let mut removed = 0;
    for key in &spec.global_keys {
        if record.shift_remove(key.as_str()).is_some() {
            removed += 1;
        }
    }

    let Some(Value::Object(fields)) = record.get_mut(FIELDS_KEY) else {
        return removed;
    };
    for (sub_key, paths) in &spec.field_paths {
        let Some(target) = fields.get_mut(sub_key.as_str()) else {
            continue;
        };
        if !(target.is_object() || target.is_array()) {
            continue;
        }
        for path in paths {
            let segments: Vec<&str> = path.split('.').collect();
            removed += delete_path(target, &segments);
        }
    }
    removed
}

/// Delete the node addressed by `path` below `node`.
///
/// Arrays fan out: the same path is applied to every object element.
/// Returns how many nodes were removed.
pub fn delete_path(node: &mut Value, path: &[&str]) -> usize {
    let Some((head, rest)) = path.split_first() else {
        return 0;
    };

    match node {
        Value::Array(items) => items
            .iter_mut()
            .filter(|item| item.is_object())
            .map(|item| delete_path(item, path))
            .sum(),
        Value::Object(map) if rest.is_empty() => usize::from(map.shift_remove(*head).is_some()),
        Value::Object(map) => match map.get_mut(*head) {
            Some(child) => delete_path(child, rest),
            None => 0,
        },
        _ => 0,
    }
}
