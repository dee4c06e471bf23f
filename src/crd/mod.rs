//! The `FlinkCluster` custom resource, in every schema version it has been
//! persisted with.
//!
//! `v1alpha1` is the legacy layout (carries `clusterName`, `*Cpus` and
//! `*EnvironmentVariables` keys); `v1alpha2` is the current one. Both share
//! the leaf types declared here and convert into each other through
//! [`conversion`].

use std::fmt;
use std::hash::{Hash, Hasher};

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::core::crd::merge_crds;
use kube::CustomResourceExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Generates one builder-style setter per field. Each setter stores exactly
/// one value and hands the spec back for chaining.
macro_rules! setters {
    ($($setter:ident($arg:ty) => $field:ident),* $(,)?) => {
        $(
            pub fn $setter(mut self, value: $arg) -> Self {
                self.$field = Some(value.into());
                self
            }
        )*
    };
}

pub mod conversion;
pub mod v1alpha1;
pub mod v1alpha2;

pub const GROUP: &str = "nextbreakpoint.com";
pub const KIND: &str = "FlinkCluster";

/// One entry of a process environment.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Hash, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlinkClusterEnvVar {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FlinkClusterEnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        FlinkClusterEnvVar {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

impl fmt::Display for FlinkClusterEnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&FlinkClusterEnvVar> for k8s_openapi::api::core::v1::EnvVar {
    fn from(var: &FlinkClusterEnvVar) -> Self {
        k8s_openapi::api::core::v1::EnvVar {
            name: var.name.clone(),
            value: var.value.clone(),
            ..k8s_openapi::api::core::v1::EnvVar::default()
        }
    }
}

/// Fractional CPU units.
///
/// Compares and hashes by a canonical bit pattern: `0.0` and `-0.0` are the
/// same value and every NaN equals every other NaN, which keeps `Eq` lawful.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, JsonSchema)]
#[serde(transparent)]
pub struct Cpus(pub f32);

impl Cpus {
    fn canonical_bits(self) -> u32 {
        if self.0.is_nan() {
            f32::NAN.to_bits()
        } else if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for Cpus {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for Cpus {}

impl Hash for Cpus {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

impl From<f32> for Cpus {
    fn from(cpus: f32) -> Self {
        Cpus(cpus)
    }
}

impl fmt::Display for Cpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Diagnostic rendering of an optional field: `null` when unset, strings
/// single-quoted.
pub(crate) struct Labelled<'a, T>(pub &'a Option<T>);

impl fmt::Display for Labelled<'_, String> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "'{value}'"),
            None => f.write_str("null"),
        }
    }
}

impl fmt::Display for Labelled<'_, i32> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => f.write_str("null"),
        }
    }
}

impl fmt::Display for Labelled<'_, Cpus> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => f.write_str("null"),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Labelled<'_, Vec<T>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(items) => {
                let joined = items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "[{joined}]")
            }
            None => f.write_str("null"),
        }
    }
}

/// A single CustomResourceDefinition serving every schema version, with the
/// current one marked as storage version.
pub fn merged_crd() -> Result<CustomResourceDefinition> {
    let crd = merge_crds(
        vec![v1alpha1::FlinkCluster::crd(), v1alpha2::FlinkCluster::crd()],
        v1alpha2::VERSION,
    )?;
    Ok(crd)
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn signed_zero_cpus_are_equal() {
        assert_eq!(Cpus(0.0), Cpus(-0.0));
        assert_eq!(hash_of(&Cpus(0.0)), hash_of(&Cpus(-0.0)));
    }

    #[test]
    fn nan_cpus_stay_reflexive() {
        let nan = Cpus(f32::NAN);
        assert_eq!(nan, nan);
        assert_eq!(hash_of(&nan), hash_of(&Cpus(-f32::NAN)));
    }

    #[test]
    fn env_var_rendering() {
        assert_eq!(FlinkClusterEnvVar::new("KEY", "value").to_string(), "KEY=value");
        assert_eq!(FlinkClusterEnvVar::new("KEY", "").to_string(), "KEY=");
        let unset = FlinkClusterEnvVar {
            name: "KEY".to_owned(),
            value: None,
        };
        assert_eq!(unset.to_string(), "KEY");
    }

    #[test]
    fn env_var_without_value_omits_key() {
        let unset = FlinkClusterEnvVar {
            name: "KEY".to_owned(),
            value: None,
        };
        assert_eq!(
            serde_json::to_value(&unset).unwrap(),
            serde_json::json!({"name": "KEY"})
        );
        assert_eq!(
            serde_json::to_value(FlinkClusterEnvVar::new("KEY", "")).unwrap(),
            serde_json::json!({"name": "KEY", "value": ""})
        );
    }

    #[test]
    fn env_var_converts_to_container_env() {
        let env: k8s_openapi::api::core::v1::EnvVar = (&FlinkClusterEnvVar::new("A", "1")).into();
        assert_eq!(env.name, "A");
        assert_eq!(env.value.as_deref(), Some("1"));
        assert!(env.value_from.is_none());
    }

    #[test]
    fn merged_crd_serves_both_versions() {
        let crd = merged_crd().unwrap();
        assert_eq!(crd.spec.group, GROUP);
        assert_eq!(crd.spec.names.kind, KIND);
        let versions: Vec<_> = crd
            .spec
            .versions
            .iter()
            .map(|v| (v.name.as_str(), v.storage))
            .collect();
        assert_eq!(versions, vec![("v1alpha1", false), ("v1alpha2", true)]);
    }
}
