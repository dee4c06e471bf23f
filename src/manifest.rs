//! Reading and writing persisted `FlinkCluster` manifests.
//!
//! Manifests are parsed into a generic document first (YAML, which also
//! accepts JSON), then into the schema version they were written with, and
//! finally upgraded to the current layout. Bare spec sections carry no
//! version and accept both key spellings. Unknown keys are ignored and
//! missing keys stay unset; only text that is not structured data, or data
//! of the wrong shape, is rejected.

use std::fmt;
use std::str::FromStr;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::crd::{v1alpha1, v1alpha2, GROUP, KIND};
use crate::{Error, FlinkCluster, FlinkClusterSpec, Result};

/// `v1alpha1` spellings of keys that `v1alpha2` renamed, paired with their
/// current name. A bare spec section may use either spelling; when both are
/// present the current one wins. `clusterName` has no current counterpart
/// and is ignored like any other unrecognized key.
pub const LEGACY_ALIASES: [(&str, &str); 4] = [
    ("jobmanagerCpus", "jobmanagerCPUs"),
    ("taskmanagerCpus", "taskmanagerCPUs"),
    ("jobmanagerEnvironmentVariables", "jobmanagerEnvironment"),
    ("taskmanagerEnvironmentVariables", "taskmanagerEnvironment"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    V1Alpha1,
    V1Alpha2,
}

impl SchemaVersion {
    pub const CURRENT: SchemaVersion = SchemaVersion::V1Alpha2;

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaVersion::V1Alpha1 => v1alpha1::VERSION,
            SchemaVersion::V1Alpha2 => v1alpha2::VERSION,
        }
    }

    pub fn api_version(self) -> String {
        format!("{GROUP}/{}", self.as_str())
    }

    pub fn from_api_version(api_version: &str) -> Result<Self> {
        api_version
            .strip_prefix(GROUP)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|version| version.parse().ok())
            .ok_or_else(|| Error::UnsupportedVersion(api_version.to_owned()))
    }
}

impl FromStr for SchemaVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            v1alpha1::VERSION => Ok(SchemaVersion::V1Alpha1),
            v1alpha2::VERSION => Ok(SchemaVersion::V1Alpha2),
            other => Err(Error::UnsupportedVersion(other.to_owned())),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

/// A manifest is either a whole resource or just its spec section.
#[derive(Debug, Clone, PartialEq)]
pub enum Manifest {
    Resource(FlinkCluster),
    Spec(FlinkClusterSpec),
}

impl Manifest {
    pub fn from_value(document: Value) -> Result<Self> {
        if document.get("apiVersion").is_some() {
            cluster_from_value(document).map(Manifest::Resource)
        } else {
            spec_from_value(document).map(Manifest::Spec)
        }
    }

    pub fn spec(&self) -> &FlinkClusterSpec {
        match self {
            Manifest::Resource(cluster) => &cluster.spec,
            Manifest::Spec(spec) => spec,
        }
    }

    pub fn metadata(&self) -> Option<&ObjectMeta> {
        match self {
            Manifest::Resource(cluster) => Some(&cluster.metadata),
            Manifest::Spec(_) => None,
        }
    }

    pub fn into_spec(self) -> FlinkClusterSpec {
        match self {
            Manifest::Resource(cluster) => cluster.spec,
            Manifest::Spec(spec) => spec,
        }
    }

    pub fn to_value(&self, version: SchemaVersion) -> Result<Value> {
        match self {
            Manifest::Resource(cluster) => cluster_to_value(cluster, version),
            Manifest::Spec(spec) => spec_to_value(spec, version),
        }
    }
}

/// Parses text into a generic structured document.
///
/// NaN and infinite numbers are rejected: the generic document has no
/// representation for them and would otherwise read them as unset.
pub fn parse_document(text: &str) -> Result<Value> {
    let document: serde_yaml::Value = serde_yaml::from_str(text)?;
    reject_non_finite(&document)?;
    Ok(serde_json::to_value(document)?)
}

pub fn read_manifest(text: &str) -> Result<Manifest> {
    Manifest::from_value(parse_document(text)?)
}

pub fn read_spec(text: &str) -> Result<FlinkClusterSpec> {
    spec_from_value(parse_document(text)?)
}

pub fn read_cluster(text: &str) -> Result<FlinkCluster> {
    cluster_from_value(parse_document(text)?)
}

/// Reads a bare spec section. Legacy key spellings are accepted through
/// [`LEGACY_ALIASES`], so sections written with either layout, or a mix of
/// both, read into the current one.
pub fn spec_from_value(mut section: Value) -> Result<FlinkClusterSpec> {
    if let Some(fields) = section.as_object_mut() {
        apply_legacy_aliases(fields);
    }
    Ok(serde_json::from_value(section)?)
}

/// Schema version of a whole resource, from its `apiVersion`. Documents of
/// another kind are rejected.
pub fn resource_version(document: &Value) -> Result<SchemaVersion> {
    let api_version = string_field(document, "apiVersion")?.ok_or(Error::MissingField("apiVersion"))?;
    let version = SchemaVersion::from_api_version(&api_version)?;
    let kind = string_field(document, "kind")?.ok_or(Error::MissingField("kind"))?;
    if kind != KIND {
        return Err(Error::UnsupportedKind(kind));
    }
    Ok(version)
}

/// Reads a whole resource, picking its layout from `apiVersion`.
pub fn cluster_from_value(document: Value) -> Result<FlinkCluster> {
    let version = resource_version(&document)?;
    debug!("reading {KIND} resource as {version}");

    match version {
        SchemaVersion::V1Alpha1 => {
            let legacy: v1alpha1::FlinkCluster = serde_json::from_value(document)?;
            Ok(legacy.into())
        }
        SchemaVersion::V1Alpha2 => Ok(serde_json::from_value(document)?),
    }
}

/// Diagnostic rendering of a document's spec in the layout it was written
/// with, so a `v1alpha1` resource still shows its `clusterName`.
pub fn describe(document: Value) -> Result<String> {
    if document.get("apiVersion").is_some() && resource_version(&document)? == SchemaVersion::V1Alpha1 {
        let legacy: v1alpha1::FlinkCluster = serde_json::from_value(document)?;
        return Ok(legacy.spec.to_string());
    }
    Ok(Manifest::from_value(document)?.spec().to_string())
}

fn string_field(document: &Value, key: &str) -> Result<Option<String>> {
    let value = document.get(key).map(String::deserialize).transpose()?;
    Ok(value)
}

fn apply_legacy_aliases(fields: &mut Map<String, Value>) {
    for (legacy, current) in LEGACY_ALIASES {
        let Some(value) = fields.remove(legacy) else {
            continue;
        };
        if fields.contains_key(current) {
            warn!("ignoring legacy key {legacy}, {current} is also set");
        } else {
            debug!("reading legacy key {legacy} as {current}");
            fields.insert(current.to_owned(), value);
        }
    }
}

fn reject_non_finite(document: &serde_yaml::Value) -> Result<()> {
    match document {
        serde_yaml::Value::Number(number) if number.is_nan() || number.is_infinite() => Err(
            Error::MalformedInput(serde::de::Error::custom(format!("non-finite number {number}"))),
        ),
        serde_yaml::Value::Sequence(items) => items.iter().try_for_each(reject_non_finite),
        serde_yaml::Value::Mapping(fields) => fields.values().try_for_each(reject_non_finite),
        serde_yaml::Value::Tagged(tagged) => reject_non_finite(&tagged.value),
        _ => Ok(()),
    }
}

pub fn spec_to_value(spec: &FlinkClusterSpec, version: SchemaVersion) -> Result<Value> {
    let value = match version {
        SchemaVersion::V1Alpha1 => {
            serde_json::to_value(v1alpha1::FlinkClusterSpec::from(spec.clone()))?
        }
        SchemaVersion::V1Alpha2 => serde_json::to_value(spec)?,
    };
    Ok(value)
}

pub fn cluster_to_value(cluster: &FlinkCluster, version: SchemaVersion) -> Result<Value> {
    let value = match version {
        SchemaVersion::V1Alpha1 => serde_json::to_value(v1alpha1::FlinkCluster::from(cluster.clone()))?,
        SchemaVersion::V1Alpha2 => serde_json::to_value(cluster)?,
    };
    Ok(value)
}

pub fn render(document: &Value, format: Format) -> Result<String> {
    let text = match format {
        Format::Json => serde_json::to_string_pretty(document)? + "\n",
        Format::Yaml => serde_yaml::to_string(document)?,
    };
    Ok(text)
}
