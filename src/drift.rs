//! Drift between an observed and a desired spec.

use std::fmt;

use log::debug;
use serde_json::{Map, Value};

use crate::{FlinkClusterSpec, Result};

/// External names of the top-level fields that differ, in lexicographic
/// order. A field that is set on one side and unset on the other counts as
/// changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    pub fields: Vec<String>,
}

impl Drift {
    /// `None` when the specs are structurally equal and reconciliation can be
    /// skipped.
    pub fn between(observed: &FlinkClusterSpec, desired: &FlinkClusterSpec) -> Result<Option<Drift>> {
        if observed == desired {
            return Ok(None);
        }

        let observed = as_map(observed)?;
        let desired = as_map(desired)?;

        let mut fields: Vec<String> = observed
            .keys()
            .chain(desired.keys())
            .filter(|key| observed.get(*key) != desired.get(*key))
            .cloned()
            .collect();
        fields.sort();
        fields.dedup();

        debug!("spec drifted on {}", fields.join(", "));
        Ok(Some(Drift { fields }))
    }
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "changed: {}", self.fields.join(", "))
    }
}

fn as_map(spec: &FlinkClusterSpec) -> Result<Map<String, Value>> {
    match serde_json::to_value(spec)? {
        Value::Object(fields) => Ok(fields),
        _ => Ok(Map::new()),
    }
}
