//! Registration of built-in options

pub mod build_jobs;
pub mod k8s;

use super::OptionsRegistry;
use anyhow::Result;

/// Subscribe all built-in options
pub fn register_all(registry: &OptionsRegistry) -> Result<()> {
    k8s::register(registry)?;
    build_jobs::register(registry)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionStore;

    #[test]
    fn test_register_all() {
        let registry = OptionsRegistry::new();
        register_all(&registry).unwrap();

        assert_eq!(registry.count(), 8);
        assert_eq!(registry.list_store(OptionStore::Settings).len(), 3);
        assert_eq!(registry.list_store(OptionStore::Persisted).len(), 5);
    }
}
