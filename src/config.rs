//! Resolution of a spec into the configuration the provisioning side works
//! with: every optional knob replaced by its effective value.

use k8s_openapi::api::core::v1::EnvVar;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use log::debug;
use serde::Serialize;

use crate::crd::{Cpus, FlinkClusterEnvVar};
use crate::{Error, FlinkCluster, FlinkClusterSpec, Result};

pub const DEFAULT_ENVIRONMENT: &str = "default";
pub const DEFAULT_PULL_POLICY: &str = "Always";
pub const DEFAULT_SERVICE_MODE: &str = "NodePort";
pub const DEFAULT_SERVICE_ACCOUNT: &str = "default";
pub const DEFAULT_STORAGE_CLASS: &str = "standard";
pub const DEFAULT_STORAGE_SIZE: i32 = 2;
pub const DEFAULT_CPUS: f32 = 1.0;
pub const DEFAULT_JOBMANAGER_MEMORY: i32 = 512;
pub const DEFAULT_TASKMANAGER_MEMORY: i32 = 1024;
pub const DEFAULT_REPLICAS: i32 = 1;
pub const DEFAULT_TASK_SLOTS: i32 = 1;
pub const DEFAULT_PARALLELISM: i32 = 1;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    pub descriptor: ClusterDescriptor,
    pub jobmanager: JobManagerConfig,
    pub taskmanager: TaskManagerConfig,
    /// Present only when a sidecar image is configured.
    pub sidecar: Option<SidecarConfig>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDescriptor {
    pub namespace: String,
    pub name: String,
    pub environment: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesConfig {
    pub cpus: f32,
    /// Megabytes.
    pub memory: i32,
}

impl ResourcesConfig {
    pub fn cpu_quantity(&self) -> Quantity {
        Quantity(format!("{}", self.cpus))
    }

    pub fn memory_quantity(&self) -> Quantity {
        Quantity(format!("{}Mi", self.memory))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    pub storage_class: String,
    /// Gigabytes.
    pub size: i32,
}

impl StorageConfig {
    pub fn quantity(&self) -> Quantity {
        Quantity(format!("{}Gi", self.size))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobManagerConfig {
    pub image: String,
    pub pull_secrets: Option<String>,
    pub pull_policy: String,
    pub service_mode: String,
    pub service_account: String,
    pub environment_variables: Vec<EnvVar>,
    pub resources: ResourcesConfig,
    pub storage: StorageConfig,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskManagerConfig {
    pub image: String,
    pub pull_secrets: Option<String>,
    pub pull_policy: String,
    pub service_account: String,
    pub task_slots: i32,
    pub replicas: i32,
    pub environment_variables: Vec<EnvVar>,
    pub resources: ResourcesConfig,
    pub storage: StorageConfig,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SidecarConfig {
    pub image: String,
    pub pull_secrets: Option<String>,
    pub pull_policy: String,
    pub service_account: String,
    pub class_name: Option<String>,
    pub jar_path: Option<String>,
    pub savepoint: Option<String>,
    /// Arguments joined with single spaces.
    pub arguments: Option<String>,
    pub parallelism: i32,
}

impl ClusterConfig {
    pub fn for_cluster(cluster: &FlinkCluster) -> Result<Self> {
        Self::resolve(&cluster.metadata, &cluster.spec)
    }

    /// Fills every unset field with its default. Only the Flink image and the
    /// resource's name and namespace are required.
    pub fn resolve(metadata: &ObjectMeta, spec: &FlinkClusterSpec) -> Result<Self> {
        let name = metadata.name.clone().ok_or(Error::MissingField("metadata.name"))?;
        let namespace = metadata
            .namespace
            .clone()
            .ok_or(Error::MissingField("metadata.namespace"))?;
        let image = spec.flink_image.clone().ok_or(Error::MissingField("flinkImage"))?;
        let pull_policy = or_default(&spec.pull_policy, DEFAULT_PULL_POLICY);

        let jobmanager = JobManagerConfig {
            image: image.clone(),
            pull_secrets: spec.pull_secrets.clone(),
            pull_policy: pull_policy.clone(),
            service_mode: or_default(&spec.service_mode, DEFAULT_SERVICE_MODE),
            service_account: or_default(&spec.jobmanager_service_account, DEFAULT_SERVICE_ACCOUNT),
            environment_variables: container_env(&spec.jobmanager_environment),
            resources: ResourcesConfig {
                cpus: cpus_or_default(spec.jobmanager_cpus),
                memory: spec.jobmanager_memory.unwrap_or(DEFAULT_JOBMANAGER_MEMORY),
            },
            storage: StorageConfig {
                storage_class: or_default(&spec.jobmanager_storage_class, DEFAULT_STORAGE_CLASS),
                size: spec.jobmanager_storage_size.unwrap_or(DEFAULT_STORAGE_SIZE),
            },
        };

        let taskmanager = TaskManagerConfig {
            image,
            pull_secrets: spec.pull_secrets.clone(),
            pull_policy: pull_policy.clone(),
            service_account: or_default(&spec.taskmanager_service_account, DEFAULT_SERVICE_ACCOUNT),
            task_slots: spec.taskmanager_task_slots.unwrap_or(DEFAULT_TASK_SLOTS),
            replicas: spec.taskmanager_replicas.unwrap_or(DEFAULT_REPLICAS),
            environment_variables: container_env(&spec.taskmanager_environment),
            resources: ResourcesConfig {
                cpus: cpus_or_default(spec.taskmanager_cpus),
                memory: spec.taskmanager_memory.unwrap_or(DEFAULT_TASKMANAGER_MEMORY),
            },
            storage: StorageConfig {
                storage_class: or_default(&spec.taskmanager_storage_class, DEFAULT_STORAGE_CLASS),
                size: spec.taskmanager_storage_size.unwrap_or(DEFAULT_STORAGE_SIZE),
            },
        };

        let sidecar = spec.sidecar_image.clone().map(|image| SidecarConfig {
            image,
            pull_secrets: spec.pull_secrets.clone(),
            pull_policy,
            service_account: or_default(&spec.sidecar_service_account, DEFAULT_SERVICE_ACCOUNT),
            class_name: spec.sidecar_class_name.clone(),
            jar_path: spec.sidecar_jar_path.clone(),
            savepoint: spec.sidecar_savepoint.clone(),
            arguments: spec.sidecar_arguments.as_ref().map(|args| args.join(" ")),
            parallelism: spec.sidecar_parallelism.unwrap_or(DEFAULT_PARALLELISM),
        });
        if sidecar.is_none() {
            debug!("no sidecar image configured for {namespace}/{name}");
        }

        Ok(ClusterConfig {
            descriptor: ClusterDescriptor {
                environment: or_default(&spec.environment, DEFAULT_ENVIRONMENT),
                namespace,
                name,
            },
            jobmanager,
            taskmanager,
            sidecar,
        })
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_owned())
}

fn cpus_or_default(cpus: Option<Cpus>) -> f32 {
    cpus.map_or(DEFAULT_CPUS, |Cpus(cpus)| cpus)
}

fn container_env(vars: &Option<Vec<FlinkClusterEnvVar>>) -> Vec<EnvVar> {
    vars.iter().flatten().map(EnvVar::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ObjectMeta {
        ObjectMeta {
            name: Some("testCluster".to_owned()),
            namespace: Some("testNamespace".to_owned()),
            ..ObjectMeta::default()
        }
    }

    fn env(name: &str, value: &str) -> EnvVar {
        EnvVar {
            name: name.to_owned(),
            value: Some(value.to_owned()),
            ..EnvVar::default()
        }
    }

    #[test]
    fn resolves_configured_values() {
        let spec = FlinkClusterSpec::default()
            .with_environment("testEnvironment")
            .with_jobmanager_cpus(1.0)
            .with_jobmanager_memory(500)
            .with_jobmanager_service_account("testServiceAccount")
            .with_jobmanager_storage_class("testStorageClass")
            .with_jobmanager_storage_size(100)
            .with_jobmanager_environment(vec![FlinkClusterEnvVar::new("key", "value")])
            .with_taskmanager_cpus(1.0)
            .with_taskmanager_memory(1000)
            .with_taskmanager_replicas(2)
            .with_taskmanager_service_account("testServiceAccount")
            .with_taskmanager_storage_class("testStorageClass")
            .with_taskmanager_storage_size(100)
            .with_taskmanager_task_slots(1)
            .with_taskmanager_environment(vec![FlinkClusterEnvVar::new("key", "value")])
            .with_service_mode("ClusterIP")
            .with_flink_image("flink:1.7.2")
            .with_pull_policy("Always")
            .with_pull_secrets("somesecrets")
            .with_sidecar_image("sidecar:1.0")
            .with_sidecar_class_name("test.TestJob")
            .with_sidecar_service_account("testServiceAccount")
            .with_sidecar_savepoint("somesavepoint")
            .with_sidecar_jar_path("test.jar")
            .with_sidecar_arguments(vec!["--key=value".into(), "--other=1".into()])
            .with_sidecar_parallelism(1);

        let config = ClusterConfig::resolve(&metadata(), &spec).unwrap();

        assert_eq!(
            config,
            ClusterConfig {
                descriptor: ClusterDescriptor {
                    namespace: "testNamespace".to_owned(),
                    name: "testCluster".to_owned(),
                    environment: "testEnvironment".to_owned(),
                },
                jobmanager: JobManagerConfig {
                    image: "flink:1.7.2".to_owned(),
                    pull_secrets: Some("somesecrets".to_owned()),
                    pull_policy: "Always".to_owned(),
                    service_mode: "ClusterIP".to_owned(),
                    service_account: "testServiceAccount".to_owned(),
                    environment_variables: vec![env("key", "value")],
                    resources: ResourcesConfig { cpus: 1.0, memory: 500 },
                    storage: StorageConfig {
                        storage_class: "testStorageClass".to_owned(),
                        size: 100,
                    },
                },
                taskmanager: TaskManagerConfig {
                    image: "flink:1.7.2".to_owned(),
                    pull_secrets: Some("somesecrets".to_owned()),
                    pull_policy: "Always".to_owned(),
                    service_account: "testServiceAccount".to_owned(),
                    task_slots: 1,
                    replicas: 2,
                    environment_variables: vec![env("key", "value")],
                    resources: ResourcesConfig { cpus: 1.0, memory: 1000 },
                    storage: StorageConfig {
                        storage_class: "testStorageClass".to_owned(),
                        size: 100,
                    },
                },
                sidecar: Some(SidecarConfig {
                    image: "sidecar:1.0".to_owned(),
                    pull_secrets: Some("somesecrets".to_owned()),
                    pull_policy: "Always".to_owned(),
                    service_account: "testServiceAccount".to_owned(),
                    class_name: Some("test.TestJob".to_owned()),
                    jar_path: Some("test.jar".to_owned()),
                    savepoint: Some("somesavepoint".to_owned()),
                    arguments: Some("--key=value --other=1".to_owned()),
                    parallelism: 1,
                }),
            }
        );
    }

    #[test]
    fn unset_fields_fall_back_to_defaults() {
        let spec = FlinkClusterSpec::default().with_flink_image("flink:1.7.2");
        let config = ClusterConfig::resolve(&metadata(), &spec).unwrap();

        assert_eq!(config.descriptor.environment, DEFAULT_ENVIRONMENT);
        assert_eq!(config.jobmanager.pull_policy, "Always");
        assert_eq!(config.jobmanager.service_mode, "NodePort");
        assert_eq!(config.jobmanager.resources, ResourcesConfig { cpus: 1.0, memory: 512 });
        assert_eq!(config.taskmanager.resources, ResourcesConfig { cpus: 1.0, memory: 1024 });
        assert_eq!(config.taskmanager.storage.storage_class, "standard");
        assert_eq!(config.taskmanager.replicas, 1);
        assert_eq!(config.taskmanager.task_slots, 1);
        assert!(config.taskmanager.environment_variables.is_empty());
        assert!(config.sidecar.is_none());
    }

    #[test]
    fn quantities() {
        let storage = StorageConfig {
            storage_class: "standard".to_owned(),
            size: 2,
        };
        assert_eq!(storage.quantity(), Quantity("2Gi".to_owned()));
        let resources = ResourcesConfig { cpus: 0.5, memory: 512 };
        assert_eq!(resources.cpu_quantity(), Quantity("0.5".to_owned()));
        assert_eq!(resources.memory_quantity(), Quantity("512Mi".to_owned()));
    }

    #[test]
    fn missing_image_or_identity_is_rejected() {
        let err = ClusterConfig::resolve(&metadata(), &FlinkClusterSpec::default()).unwrap_err();
        assert!(matches!(err, Error::MissingField("flinkImage")));

        let cluster = FlinkCluster::new("test", FlinkClusterSpec::default().with_flink_image("flink"));
        let err = ClusterConfig::for_cluster(&cluster).unwrap_err();
        assert!(matches!(err, Error::MissingField("metadata.namespace")));
    }
}
