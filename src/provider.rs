//! Cloud provider trait definition.
//!
//! This module defines the [`CloudProvider`] trait, the seam between the
//! deployment workflow and whatever management SDK actually creates
//! resources. The contract is deliberately thin: create, deploy or delete
//! something and return a handle or an error.

use crate::{AccessPolicy, DatabaseKeys, Resource, Result, ServicePrincipalCredential};
use async_trait::async_trait;
use std::collections::HashMap;

/// A cloud management API capable of running the demo deployment.
///
/// All implementations must be `Send + Sync` so a provider can be moved
/// into a spawned task.
///
/// # Errors
///
/// Every operation other than [`authenticate`](Self::authenticate) returns
/// [`VaultwireError::NotAuthenticated`](crate::VaultwireError::NotAuthenticated)
/// when called before a successful authentication. Operations inside a
/// resource group return
/// [`VaultwireError::NotFound`](crate::VaultwireError::NotFound) when the
/// group does not exist.
///
/// # Example
///
/// ```no_run
/// use vaultwire::{factory, DeployConfig, ProviderType, ServicePrincipalCredential};
///
/// #[tokio::main]
/// async fn main() -> vaultwire::Result<()> {
///     let mut provider = factory::new_provider(DeployConfig::new(ProviderType::Memory))?;
///
///     let credential = ServicePrincipalCredential::new("abc", "xyz", None);
///     provider.authenticate(&credential).await?;
///     provider.create_resource_group("rg-demo", "eastus").await?;
///     provider.delete_resource_group("rg-demo").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait CloudProvider: Send + Sync {
    // ========================================================================
    // Metadata
    // ========================================================================

    /// Returns the provider name (e.g., "memory").
    fn name(&self) -> &str;

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Signs in with a service principal.
    ///
    /// # Errors
    ///
    /// Returns [`VaultwireError::NotAuthenticated`](crate::VaultwireError::NotAuthenticated)
    /// if the provider rejects the credential.
    async fn authenticate(&mut self, credential: &ServicePrincipalCredential) -> Result<()>;

    // ========================================================================
    // Provisioning
    // ========================================================================

    /// Creates a resource group.
    ///
    /// # Errors
    ///
    /// - [`VaultwireError::AlreadyExists`](crate::VaultwireError::AlreadyExists):
    ///   a group with this name exists
    /// - [`VaultwireError::InvalidResourceName`](crate::VaultwireError::InvalidResourceName)
    async fn create_resource_group(&mut self, name: &str, region: &str) -> Result<Resource>;

    /// Creates a document database account inside `group`.
    async fn create_document_db(&mut self, group: &str, name: &str, region: &str)
        -> Result<Resource>;

    /// Returns the endpoint and master keys of a database account.
    async fn list_database_keys(&self, group: &str, account: &str) -> Result<DatabaseKeys>;

    /// Creates a key vault granting `policy` to one identity.
    ///
    /// The returned resource carries the vault URI under
    /// [`VAULT_URI`](crate::resource::VAULT_URI).
    async fn create_key_vault(
        &mut self,
        group: &str,
        name: &str,
        region: &str,
        policy: AccessPolicy,
    ) -> Result<Resource>;

    /// Stores or overwrites a secret in a vault.
    async fn set_secret(&mut self, vault: &Resource, name: &str, value: &str) -> Result<Resource>;

    /// Creates a web app with the given application settings.
    ///
    /// The returned resource carries its host name under
    /// [`DEFAULT_HOST_NAME`](crate::resource::DEFAULT_HOST_NAME).
    async fn create_web_app(
        &mut self,
        group: &str,
        name: &str,
        region: &str,
        app_settings: HashMap<String, String>,
    ) -> Result<Resource>;

    /// Deploys application source from a git repository to a web app.
    async fn deploy_source(
        &mut self,
        web_app: &Resource,
        repository_url: &str,
        branch: &str,
    ) -> Result<()>;

    // ========================================================================
    // Inspection and teardown
    // ========================================================================

    /// Lists every resource in a group, the group itself excluded.
    async fn list_resources(&self, group: &str) -> Result<Vec<Resource>>;

    /// Deletes a resource group and everything in it.
    ///
    /// # Errors
    ///
    /// Returns [`VaultwireError::NotFound`](crate::VaultwireError::NotFound)
    /// if the group does not exist.
    async fn delete_resource_group(&mut self, name: &str) -> Result<()>;
}
