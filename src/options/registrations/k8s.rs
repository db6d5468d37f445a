//! Cluster connection options, provisioned through deployment settings

use crate::options::{ConfType, OptionBuilder, OptionsRegistry};
use anyhow::Result;
use serde_json::json;

pub const K8S_NAMESPACE: &str = "K8S_NAMESPACE";
pub const K8S_CONFIG: &str = "K8S_CONFIG";
pub const K8S_IN_CLUSTER: &str = "K8S_IN_CLUSTER";

/// Subscribe the cluster connection options
pub fn register(registry: &OptionsRegistry) -> Result<()> {
    registry.subscribe(
        OptionBuilder::new(K8S_NAMESPACE)
            .global()
            .required()
            .typing(ConfType::Str)
            .description("Namespace build jobs are scheduled into")
            .build()?,
    );

    registry.subscribe(
        OptionBuilder::new(K8S_CONFIG)
            .global()
            .typing(ConfType::Str)
            .description("Path to a kubeconfig file, unset when running in-cluster")
            .build()?,
    );

    registry.subscribe(
        OptionBuilder::new(K8S_IN_CLUSTER)
            .global()
            .typing(ConfType::Bool)
            .default(json!(true))
            .description("Use the in-cluster service account")
            .build()?,
    );

    log::debug!("Registered k8s options");
    Ok(())
}
