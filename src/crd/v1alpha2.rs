//! Current `FlinkCluster` layout.

use std::fmt;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Cpus, FlinkClusterEnvVar, Labelled};

pub const VERSION: &str = "v1alpha2";

/// Desired state of one Flink cluster.
///
/// Every field is optional and an unset field is different from an empty
/// one: unset fields are omitted from the manifest, empty strings and lists
/// are written out. Equality and hashing cover all fields in declaration
/// order, lists element by element.
#[derive(
    CustomResource, Serialize, Deserialize, Debug, Default, PartialEq, Eq, Hash, Clone, JsonSchema,
)]
#[kube(
    group = "nextbreakpoint.com",
    version = "v1alpha2",
    kind = "FlinkCluster",
    plural = "flinkclusters",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct FlinkClusterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_secrets: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flink_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_mode: Option<String>,

    #[serde(rename = "jobmanagerCPUs", skip_serializing_if = "Option::is_none")]
    pub jobmanager_cpus: Option<Cpus>,
    /// Megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobmanager_memory: Option<i32>,
    /// Gigabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobmanager_storage_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobmanager_storage_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobmanager_service_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobmanager_environment: Option<Vec<FlinkClusterEnvVar>>,

    #[serde(rename = "taskmanagerCPUs", skip_serializing_if = "Option::is_none")]
    pub taskmanager_cpus: Option<Cpus>,
    /// Megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taskmanager_memory: Option<i32>,
    /// Gigabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taskmanager_storage_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taskmanager_storage_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taskmanager_replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taskmanager_task_slots: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taskmanager_service_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taskmanager_environment: Option<Vec<FlinkClusterEnvVar>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidecar_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidecar_class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidecar_jar_path: Option<String>,
    /// Passed to the sidecar verbatim, in order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidecar_arguments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidecar_service_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidecar_savepoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidecar_parallelism: Option<i32>,
}

impl FlinkClusterSpec {
    setters! {
        with_environment(impl Into<String>) => environment,
        with_pull_secrets(impl Into<String>) => pull_secrets,
        with_pull_policy(impl Into<String>) => pull_policy,
        with_flink_image(impl Into<String>) => flink_image,
        with_service_mode(impl Into<String>) => service_mode,
        with_jobmanager_cpus(f32) => jobmanager_cpus,
        with_jobmanager_memory(i32) => jobmanager_memory,
        with_jobmanager_storage_size(i32) => jobmanager_storage_size,
        with_jobmanager_storage_class(impl Into<String>) => jobmanager_storage_class,
        with_jobmanager_service_account(impl Into<String>) => jobmanager_service_account,
        with_jobmanager_environment(Vec<FlinkClusterEnvVar>) => jobmanager_environment,
        with_taskmanager_cpus(f32) => taskmanager_cpus,
        with_taskmanager_memory(i32) => taskmanager_memory,
        with_taskmanager_storage_size(i32) => taskmanager_storage_size,
        with_taskmanager_storage_class(impl Into<String>) => taskmanager_storage_class,
        with_taskmanager_replicas(i32) => taskmanager_replicas,
        with_taskmanager_task_slots(i32) => taskmanager_task_slots,
        with_taskmanager_service_account(impl Into<String>) => taskmanager_service_account,
        with_taskmanager_environment(Vec<FlinkClusterEnvVar>) => taskmanager_environment,
        with_sidecar_image(impl Into<String>) => sidecar_image,
        with_sidecar_class_name(impl Into<String>) => sidecar_class_name,
        with_sidecar_jar_path(impl Into<String>) => sidecar_jar_path,
        with_sidecar_arguments(Vec<String>) => sidecar_arguments,
        with_sidecar_service_account(impl Into<String>) => sidecar_service_account,
        with_sidecar_savepoint(impl Into<String>) => sidecar_savepoint,
        with_sidecar_parallelism(i32) => sidecar_parallelism,
    }
}

impl fmt::Display for FlinkClusterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlinkClusterSpec {{")?;
        write!(f, "environment={}", Labelled(&self.environment))?;
        write!(f, ", pullSecrets={}", Labelled(&self.pull_secrets))?;
        write!(f, ", pullPolicy={}", Labelled(&self.pull_policy))?;
        write!(f, ", flinkImage={}", Labelled(&self.flink_image))?;
        write!(f, ", serviceMode={}", Labelled(&self.service_mode))?;
        write!(f, ", jobmanagerCPUs={}", Labelled(&self.jobmanager_cpus))?;
        write!(f, ", jobmanagerMemory={}", Labelled(&self.jobmanager_memory))?;
        write!(f, ", jobmanagerStorageSize={}", Labelled(&self.jobmanager_storage_size))?;
        write!(f, ", jobmanagerStorageClass={}", Labelled(&self.jobmanager_storage_class))?;
        write!(f, ", jobmanagerServiceAccount={}", Labelled(&self.jobmanager_service_account))?;
        write!(f, ", jobmanagerEnvironment={}", Labelled(&self.jobmanager_environment))?;
        write!(f, ", taskmanagerCPUs={}", Labelled(&self.taskmanager_cpus))?;
        write!(f, ", taskmanagerMemory={}", Labelled(&self.taskmanager_memory))?;
        write!(f, ", taskmanagerStorageSize={}", Labelled(&self.taskmanager_storage_size))?;
        write!(f, ", taskmanagerStorageClass={}", Labelled(&self.taskmanager_storage_class))?;
        write!(f, ", taskmanagerReplicas={}", Labelled(&self.taskmanager_replicas))?;
        write!(f, ", taskmanagerTaskSlots={}", Labelled(&self.taskmanager_task_slots))?;
        write!(f, ", taskmanagerServiceAccount={}", Labelled(&self.taskmanager_service_account))?;
        write!(f, ", taskmanagerEnvironment={}", Labelled(&self.taskmanager_environment))?;
        write!(f, ", sidecarImage={}", Labelled(&self.sidecar_image))?;
        write!(f, ", sidecarClassName={}", Labelled(&self.sidecar_class_name))?;
        write!(f, ", sidecarJarPath={}", Labelled(&self.sidecar_jar_path))?;
        write!(f, ", sidecarArguments={}", Labelled(&self.sidecar_arguments))?;
        write!(f, ", sidecarServiceAccount={}", Labelled(&self.sidecar_service_account))?;
        write!(f, ", sidecarSavepoint={}", Labelled(&self.sidecar_savepoint))?;
        write!(f, ", sidecarParallelism={}", Labelled(&self.sidecar_parallelism))?;
        write!(f, "}}")
    }
}
