//! Vaultwire - wire a document database, a secrets vault and a web app
//! together with service-principal credentials.
//!
//! The crate has two halves:
//!
//! - **Credentials**: [`auth_file`] reads a service-principal auth file (a
//!   JSON object or `key=value` lines) into a field map, and
//!   [`ServicePrincipalCredential`] pulls the client id, secret and tenant
//!   out of it.
//! - **Deployment**: [`Deployment`] provisions a resource group, a document
//!   database account, a key vault holding the database secrets and a web
//!   app configured to read them, deploys a sample application, and deletes
//!   everything afterwards. The cloud itself sits behind the
//!   [`CloudProvider`] trait.
//!
//! # Quick Start
//!
//! ```no_run
//! use vaultwire::auth_file::parse_auth_file;
//! use vaultwire::{factory, DeployConfig, Deployment, ProviderType, ServicePrincipalCredential};
//!
//! #[tokio::main]
//! async fn main() -> vaultwire::Result<()> {
//!     let map = parse_auth_file("/home/me/my.azureauth")?;
//!     let credential = ServicePrincipalCredential::from_map(&map);
//!     credential.validate()?;
//!
//!     let config = DeployConfig::new(ProviderType::Memory).with_prefix("todo");
//!     let provider = factory::new_provider(config.clone())?;
//!
//!     let report = Deployment::new(provider, config, credential).run().await?;
//!     println!("deployed to {}", report.web_app_url);
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! | Provider | Feature Flag | Notes |
//! |----------|-------------|-------|
//! | Memory | `memory` (default) | In-memory provider with error injection |

pub mod auth_file;
pub mod config;
pub mod credential;
pub mod error;
pub mod factory;
pub mod provider;
pub mod providers;
pub mod resource;
pub mod validation;
pub mod workflow;

pub use auth_file::CredentialMap;
pub use config::{DeployConfig, ProviderType, ResourceNames};
pub use credential::ServicePrincipalCredential;
pub use error::{Result, VaultwireError};
pub use provider::CloudProvider;
pub use resource::{AccessPolicy, DatabaseKeys, Resource, ResourceKind, SecretPermission};
pub use workflow::{CleanupStatus, Deployment, DeploymentReport};

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the vaultwire library.
///
/// Registers all compiled providers with the factory. Idempotent;
/// [`factory::new_provider`] calls it before every lookup.
pub fn init() {
    INIT.call_once(providers::register_all);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_initialization() {
        init();
        init();
    }

    #[tokio::test]
    #[cfg(feature = "memory")]
    async fn test_factory_after_init() {
        init();

        let config = DeployConfig::new(ProviderType::Memory);
        let provider = factory::new_provider(config);

        assert!(provider.is_ok());
    }
}
