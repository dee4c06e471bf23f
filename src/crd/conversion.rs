//! Conversions between the persisted layouts.
//!
//! Both directions destructure the source exhaustively, so adding a field to
//! either version does not compile until its mapping is decided here.

use log::debug;

use super::{v1alpha1, v1alpha2};

impl From<v1alpha1::FlinkClusterSpec> for v1alpha2::FlinkClusterSpec {
    fn from(spec: v1alpha1::FlinkClusterSpec) -> Self {
        let v1alpha1::FlinkClusterSpec {
            cluster_name,
            environment,
            pull_secrets,
            pull_policy,
            flink_image,
            service_mode,
            jobmanager_cpus,
            jobmanager_memory,
            jobmanager_storage_size,
            jobmanager_storage_class,
            jobmanager_service_account,
            jobmanager_environment_variables,
            taskmanager_cpus,
            taskmanager_memory,
            taskmanager_storage_size,
            taskmanager_storage_class,
            taskmanager_replicas,
            taskmanager_task_slots,
            taskmanager_service_account,
            taskmanager_environment_variables,
            sidecar_image,
            sidecar_class_name,
            sidecar_jar_path,
            sidecar_arguments,
            sidecar_service_account,
            sidecar_savepoint,
            sidecar_parallelism,
        } = spec;

        if let Some(cluster_name) = cluster_name {
            debug!("dropping legacy clusterName {cluster_name:?} while upgrading to v1alpha2");
        }

        v1alpha2::FlinkClusterSpec {
            environment,
            pull_secrets,
            pull_policy,
            flink_image,
            service_mode,
            jobmanager_cpus,
            jobmanager_memory,
            jobmanager_storage_size,
            jobmanager_storage_class,
            jobmanager_service_account,
            jobmanager_environment: jobmanager_environment_variables,
            taskmanager_cpus,
            taskmanager_memory,
            taskmanager_storage_size,
            taskmanager_storage_class,
            taskmanager_replicas,
            taskmanager_task_slots,
            taskmanager_service_account,
            taskmanager_environment: taskmanager_environment_variables,
            sidecar_image,
            sidecar_class_name,
            sidecar_jar_path,
            sidecar_arguments,
            sidecar_service_account,
            sidecar_savepoint,
            sidecar_parallelism,
        }
    }
}

/// `clusterName` has no source in `v1alpha2` and stays unset.
impl From<v1alpha2::FlinkClusterSpec> for v1alpha1::FlinkClusterSpec {
    fn from(spec: v1alpha2::FlinkClusterSpec) -> Self {
        let v1alpha2::FlinkClusterSpec {
            environment,
            pull_secrets,
            pull_policy,
            flink_image,
            service_mode,
            jobmanager_cpus,
            jobmanager_memory,
            jobmanager_storage_size,
            jobmanager_storage_class,
            jobmanager_service_account,
            jobmanager_environment,
            taskmanager_cpus,
            taskmanager_memory,
            taskmanager_storage_size,
            taskmanager_storage_class,
            taskmanager_replicas,
            taskmanager_task_slots,
            taskmanager_service_account,
            taskmanager_environment,
            sidecar_image,
            sidecar_class_name,
            sidecar_jar_path,
            sidecar_arguments,
            sidecar_service_account,
            sidecar_savepoint,
            sidecar_parallelism,
        } = spec;

        v1alpha1::FlinkClusterSpec {
            cluster_name: None,
            environment,
            pull_secrets,
            pull_policy,
            flink_image,
            service_mode,
            jobmanager_cpus,
            jobmanager_memory,
            jobmanager_storage_size,
            jobmanager_storage_class,
            jobmanager_service_account,
            jobmanager_environment_variables: jobmanager_environment,
            taskmanager_cpus,
            taskmanager_memory,
            taskmanager_storage_size,
            taskmanager_storage_class,
            taskmanager_replicas,
            taskmanager_task_slots,
            taskmanager_service_account,
            taskmanager_environment_variables: taskmanager_environment,
            sidecar_image,
            sidecar_class_name,
            sidecar_jar_path,
            sidecar_arguments,
            sidecar_service_account,
            sidecar_savepoint,
            sidecar_parallelism,
        }
    }
}

impl From<v1alpha1::FlinkCluster> for v1alpha2::FlinkCluster {
    fn from(cluster: v1alpha1::FlinkCluster) -> Self {
        v1alpha2::FlinkCluster {
            metadata: cluster.metadata,
            spec: cluster.spec.into(),
        }
    }
}

impl From<v1alpha2::FlinkCluster> for v1alpha1::FlinkCluster {
    fn from(cluster: v1alpha2::FlinkCluster) -> Self {
        v1alpha1::FlinkCluster {
            metadata: cluster.metadata,
            spec: cluster.spec.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::crd::FlinkClusterEnvVar;

    use super::*;

    #[test]
    fn upgrade_renames_fields_and_drops_cluster_name() {
        let legacy = v1alpha1::FlinkClusterSpec::default()
            .with_cluster_name("test")
            .with_jobmanager_cpus(2.0)
            .with_taskmanager_cpus(1.0)
            .with_jobmanager_environment_variables(vec![FlinkClusterEnvVar::new("A", "1")])
            .with_taskmanager_environment_variables(vec![]);

        let current: v1alpha2::FlinkClusterSpec = legacy.into();

        assert_eq!(
            current,
            v1alpha2::FlinkClusterSpec::default()
                .with_jobmanager_cpus(2.0)
                .with_taskmanager_cpus(1.0)
                .with_jobmanager_environment(vec![FlinkClusterEnvVar::new("A", "1")])
                .with_taskmanager_environment(vec![])
        );
    }

    #[test]
    fn downgrade_then_upgrade_is_lossless() {
        let current = v1alpha2::FlinkClusterSpec::default()
            .with_flink_image("flink:1.7.2")
            .with_taskmanager_replicas(3)
            .with_taskmanager_environment(vec![FlinkClusterEnvVar::new("B", "")])
            .with_sidecar_arguments(vec!["--key=value".into()]);

        let legacy: v1alpha1::FlinkClusterSpec = current.clone().into();
        assert_eq!(legacy.cluster_name, None);
        assert_eq!(
            legacy.taskmanager_environment_variables,
            Some(vec![FlinkClusterEnvVar::new("B", "")])
        );

        let back: v1alpha2::FlinkClusterSpec = legacy.into();
        assert_eq!(back, current);
    }

    #[test]
    fn resource_conversion_keeps_metadata() {
        let legacy = v1alpha1::FlinkCluster::new(
            "test",
            v1alpha1::FlinkClusterSpec::default().with_environment("prod"),
        );
        let current: v1alpha2::FlinkCluster = legacy.into();
        assert_eq!(current.metadata.name.as_deref(), Some("test"));
        assert_eq!(current.spec.environment.as_deref(), Some("prod"));
    }
}
