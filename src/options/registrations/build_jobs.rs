//! Build job options, editable per owner through the config database

use crate::options::{ConfType, OptionBuilder, OptionsRegistry};
use anyhow::Result;
use serde_json::json;

pub const IMAGE_REUSE_SECONDS: &str = "BUILD_JOBS_IMAGE_REUSE_SECONDS";
pub const NODE_SELECTORS: &str = "BUILD_JOBS_NODE_SELECTORS";
pub const DOCKER_REGISTRY: &str = "BUILD_JOBS_DOCKER_REGISTRY";
pub const DOCKER_REGISTRY_PASSWORD: &str = "BUILD_JOBS_DOCKER_REGISTRY_PASSWORD";
pub const BUILD_STEPS: &str = "BUILD_JOBS_BUILD_STEPS";

/// Subscribe the build job options
pub fn register(registry: &OptionsRegistry) -> Result<()> {
    registry.subscribe(
        OptionBuilder::new(IMAGE_REUSE_SECONDS)
            .global()
            .persisted()
            .typing(ConfType::Int)
            .default(json!(3600))
            .cache_ttl(60)
            .description("Seconds a successfully built image is reused before rebuilding")
            .build()?,
    );

    registry.subscribe(
        OptionBuilder::new(NODE_SELECTORS)
            .persisted()
            .typing(ConfType::Dict)
            .cache_ttl(60)
            .description("Node selectors applied to build job pods")
            .build()?,
    );

    registry.subscribe(
        OptionBuilder::new(DOCKER_REGISTRY)
            .persisted()
            .typing(ConfType::Uri)
            .description("Registry built images are pushed to")
            .build()?,
    );

    registry.subscribe(
        OptionBuilder::new(DOCKER_REGISTRY_PASSWORD)
            .persisted()
            .secret()
            .typing(ConfType::Str)
            .description("Password for the image registry")
            .build()?,
    );

    registry.subscribe(
        OptionBuilder::new(BUILD_STEPS)
            .persisted()
            .list()
            .typing(ConfType::Str)
            .description("Extra commands run before the image is committed")
            .build()?,
    );

    log::debug!("Registered build job options");
    Ok(())
}
