//! Provider registry.
//!
//! Providers register a constructor under their [`ProviderType`]; callers
//! ask for one through [`new_provider`]. Registration of the compiled-in
//! providers happens on first lookup.

use crate::{CloudProvider, DeployConfig, ProviderType, Result, VaultwireError};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// Constructor stored in the registry.
pub type ProviderFactory = fn(DeployConfig) -> Result<Box<dyn CloudProvider>>;

static PROVIDERS: OnceLock<RwLock<HashMap<ProviderType, ProviderFactory>>> = OnceLock::new();

fn providers() -> &'static RwLock<HashMap<ProviderType, ProviderFactory>> {
    PROVIDERS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Registers (or replaces) the constructor for `provider`.
pub fn register_provider(provider: ProviderType, factory: ProviderFactory) {
    providers()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(provider, factory);
}

/// Builds the provider named by `config.provider`.
///
/// # Errors
///
/// Fails if no provider of that type was compiled in, or if its constructor
/// fails.
///
/// # Example
///
/// ```
/// use vaultwire::{factory, DeployConfig, ProviderType};
///
/// let provider = factory::new_provider(DeployConfig::new(ProviderType::Memory))?;
/// assert_eq!(provider.name(), "memory");
/// # Ok::<(), vaultwire::VaultwireError>(())
/// ```
pub fn new_provider(config: DeployConfig) -> Result<Box<dyn CloudProvider>> {
    crate::init();

    let factory = providers()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(&config.provider)
        .copied()
        .ok_or_else(|| {
            VaultwireError::Other(anyhow::anyhow!(
                "provider '{}' is not compiled in (enable the '{}' feature)",
                config.provider,
                config.provider
            ))
        })?;

    factory(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "memory")]
    fn test_lookup_registers_on_demand() {
        let provider = new_provider(DeployConfig::new(ProviderType::Memory)).unwrap();
        assert_eq!(provider.name(), "memory");
        assert!(providers().read().unwrap().contains_key(&ProviderType::Memory));
    }

    #[tokio::test]
    #[cfg(feature = "memory")]
    async fn test_factory_provider_is_usable() {
        let mut provider = new_provider(DeployConfig::new(ProviderType::Memory)).unwrap();
        let credential = crate::ServicePrincipalCredential::new("abc", "xyz", None);

        provider.authenticate(&credential).await.unwrap();
        provider.create_resource_group("rg-factory", "eastus").await.unwrap();
        assert!(provider.list_resources("rg-factory").await.unwrap().is_empty());
    }

    #[test]
    #[cfg(not(feature = "memory"))]
    fn test_missing_provider_error() {
        let err = new_provider(DeployConfig::new(ProviderType::Memory)).unwrap_err();
        assert!(err.to_string().contains("not compiled in"));
    }
}
