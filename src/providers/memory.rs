//! In-memory provider.
//!
//! Keeps every resource in process memory and supports error injection, so
//! the deployment workflow can be exercised end to end without a cloud
//! account.

use crate::resource::{DEFAULT_HOST_NAME, DOCUMENT_ENDPOINT, VAULT_URI};
use crate::validation::{
    validate_account_name, validate_resource_group_name, validate_secret_name,
    validate_vault_name, validate_web_app_name,
};
use crate::*;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct State {
    groups: HashMap<String, Vec<Resource>>,
    database_keys: HashMap<String, DatabaseKeys>,
    policies: HashMap<String, AccessPolicy>,
    secrets: HashMap<String, HashMap<String, String>>,
    app_settings: HashMap<String, HashMap<String, String>>,
    deployments: HashMap<String, (String, String)>,
}

impl State {
    fn group_mut(&mut self, name: &str) -> Result<&mut Vec<Resource>> {
        self.groups
            .get_mut(name)
            .ok_or_else(|| VaultwireError::NotFound(name.to_string()))
    }

    fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        self.groups
            .values()
            .flatten()
            .any(|r| r.kind == kind && r.name == name)
    }
}

/// In-memory cloud provider.
///
/// # Example
///
/// ```
/// use vaultwire::providers::memory::MemoryProvider;
/// use vaultwire::{CloudProvider, ServicePrincipalCredential};
///
/// #[tokio::main]
/// async fn main() -> vaultwire::Result<()> {
///     let mut provider = MemoryProvider::new();
///     let handle = provider.handle();
///
///     provider
///         .authenticate(&ServicePrincipalCredential::new("abc", "xyz", None))
///         .await?;
///     provider.create_resource_group("rg-demo", "eastus").await?;
///
///     assert!(handle.has_resource_group("rg-demo").await);
///     Ok(())
/// }
/// ```
pub struct MemoryProvider {
    state: Arc<RwLock<State>>,
    authenticated: bool,

    /// Error to return from `authenticate()`
    pub auth_error: Option<VaultwireError>,
    /// Error to return from every `create_*()` call and `set_secret()`
    pub create_error: Option<VaultwireError>,
    /// Error to return from `deploy_source()`
    pub deploy_error: Option<VaultwireError>,
    /// Error to return from `delete_resource_group()`
    pub delete_error: Option<VaultwireError>,
}

impl MemoryProvider {
    /// Creates a provider with no resources.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            authenticated: false,
            auth_error: None,
            create_error: None,
            deploy_error: None,
            delete_error: None,
        }
    }

    /// Returns a handle for inspecting this provider's state.
    ///
    /// The handle stays valid after the provider is moved into a
    /// [`Deployment`](crate::Deployment).
    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn ensure_authenticated(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(VaultwireError::NotAuthenticated)
        }
    }

    fn check_create(&self) -> Result<()> {
        self.ensure_authenticated()?;
        if let Some(ref err) = self.create_error {
            return Err(VaultwireError::Other(anyhow::anyhow!("{}", err)));
        }
        Ok(())
    }

    async fn insert(&self, group: &str, resource: Resource) -> Result<Resource> {
        let mut state = self.state.write().await;
        if state.contains(resource.kind, &resource.name) {
            return Err(VaultwireError::AlreadyExists(resource.name));
        }
        state.group_mut(group)?.push(resource.clone());
        debug!(kind = %resource.kind, name = %resource.name, "memory provider created resource");
        Ok(resource)
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_key() -> String {
    let mut bytes = Vec::with_capacity(64);
    for _ in 0..4 {
        bytes.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    }
    STANDARD.encode(bytes)
}

#[async_trait]
impl CloudProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn authenticate(&mut self, credential: &ServicePrincipalCredential) -> Result<()> {
        if let Some(ref err) = self.auth_error {
            return Err(VaultwireError::Other(anyhow::anyhow!("{}", err)));
        }
        if credential.validate().is_err() {
            return Err(VaultwireError::NotAuthenticated);
        }
        self.authenticated = true;
        Ok(())
    }

    async fn create_resource_group(&mut self, name: &str, region: &str) -> Result<Resource> {
        self.check_create()?;
        validate_resource_group_name(name)?;

        let mut state = self.state.write().await;
        if state.groups.contains_key(name) {
            return Err(VaultwireError::AlreadyExists(name.to_string()));
        }

        state.groups.insert(name.to_string(), Vec::new());
        Ok(Resource::new(ResourceKind::ResourceGroup, name, name, region))
    }

    async fn create_document_db(
        &mut self,
        group: &str,
        name: &str,
        region: &str,
    ) -> Result<Resource> {
        self.check_create()?;
        validate_account_name(name)?;

        let endpoint = format!("https://{}.documents.azure.com:443/", name);
        let resource = Resource::new(ResourceKind::DocumentDbAccount, name, group, region)
            .with_property(DOCUMENT_ENDPOINT, endpoint.clone());
        let resource = self.insert(group, resource).await?;

        self.state.write().await.database_keys.insert(
            name.to_string(),
            DatabaseKeys {
                endpoint,
                primary_master_key: generate_key(),
                secondary_master_key: generate_key(),
            },
        );
        Ok(resource)
    }

    async fn list_database_keys(&self, group: &str, account: &str) -> Result<DatabaseKeys> {
        self.ensure_authenticated()?;

        let state = self.state.read().await;
        let in_group = state
            .groups
            .get(group)
            .ok_or_else(|| VaultwireError::NotFound(group.to_string()))?
            .iter()
            .any(|r| r.kind == ResourceKind::DocumentDbAccount && r.name == account);
        if !in_group {
            return Err(VaultwireError::NotFound(account.to_string()));
        }

        state
            .database_keys
            .get(account)
            .cloned()
            .ok_or_else(|| VaultwireError::NotFound(account.to_string()))
    }

    async fn create_key_vault(
        &mut self,
        group: &str,
        name: &str,
        region: &str,
        policy: AccessPolicy,
    ) -> Result<Resource> {
        self.check_create()?;
        validate_vault_name(name)?;

        let resource = Resource::new(ResourceKind::KeyVault, name, group, region)
            .with_property(VAULT_URI, format!("https://{}.vault.azure.net/", name));
        let resource = self.insert(group, resource).await?;

        let mut state = self.state.write().await;
        state.policies.insert(name.to_string(), policy);
        state.secrets.insert(name.to_string(), HashMap::new());
        Ok(resource)
    }

    async fn set_secret(&mut self, vault: &Resource, name: &str, value: &str) -> Result<Resource> {
        self.check_create()?;
        validate_secret_name(name)?;

        let mut state = self.state.write().await;
        let secrets = state
            .secrets
            .get_mut(&vault.name)
            .ok_or_else(|| VaultwireError::NotFound(vault.name.clone()))?;
        secrets.insert(name.to_string(), value.to_string());

        let vault_uri = vault.property(VAULT_URI).unwrap_or_default();
        let mut secret =
            Resource::new(ResourceKind::Secret, name, &vault.resource_group, &vault.region);
        secret.id = format!("{}secrets/{}", vault_uri, name);
        Ok(secret)
    }

    async fn create_web_app(
        &mut self,
        group: &str,
        name: &str,
        region: &str,
        app_settings: HashMap<String, String>,
    ) -> Result<Resource> {
        self.check_create()?;
        validate_web_app_name(name)?;

        let resource = Resource::new(ResourceKind::WebApp, name, group, region)
            .with_property(DEFAULT_HOST_NAME, format!("{}.azurewebsites.net", name));
        let resource = self.insert(group, resource).await?;

        self.state
            .write()
            .await
            .app_settings
            .insert(name.to_string(), app_settings);
        Ok(resource)
    }

    async fn deploy_source(
        &mut self,
        web_app: &Resource,
        repository_url: &str,
        branch: &str,
    ) -> Result<()> {
        self.ensure_authenticated()?;
        if let Some(ref err) = self.deploy_error {
            return Err(VaultwireError::Other(anyhow::anyhow!("{}", err)));
        }

        let mut state = self.state.write().await;
        if !state.app_settings.contains_key(&web_app.name) {
            return Err(VaultwireError::NotFound(web_app.name.clone()));
        }
        state.deployments.insert(
            web_app.name.clone(),
            (repository_url.to_string(), branch.to_string()),
        );
        Ok(())
    }

    async fn list_resources(&self, group: &str) -> Result<Vec<Resource>> {
        self.ensure_authenticated()?;

        let state = self.state.read().await;
        state
            .groups
            .get(group)
            .cloned()
            .ok_or_else(|| VaultwireError::NotFound(group.to_string()))
    }

    async fn delete_resource_group(&mut self, name: &str) -> Result<()> {
        self.ensure_authenticated()?;
        if let Some(ref err) = self.delete_error {
            return Err(VaultwireError::Other(anyhow::anyhow!("{}", err)));
        }

        let mut state = self.state.write().await;
        let resources = state
            .groups
            .remove(name)
            .ok_or_else(|| VaultwireError::NotFound(name.to_string()))?;

        for resource in &resources {
            state.database_keys.remove(&resource.name);
            state.policies.remove(&resource.name);
            state.secrets.remove(&resource.name);
            state.app_settings.remove(&resource.name);
            state.deployments.remove(&resource.name);
        }
        Ok(())
    }
}

/// Read-only view of a [`MemoryProvider`]'s state.
#[derive(Clone)]
pub struct MemoryHandle {
    state: Arc<RwLock<State>>,
}

impl MemoryHandle {
    /// Returns true if the resource group exists.
    pub async fn has_resource_group(&self, name: &str) -> bool {
        self.state.read().await.groups.contains_key(name)
    }

    /// Reads a secret value from a vault.
    pub async fn secret(&self, vault: &str, name: &str) -> Option<String> {
        self.state
            .read()
            .await
            .secrets
            .get(vault)
            .and_then(|s| s.get(name).cloned())
    }

    /// Returns the access policy a vault was created with.
    pub async fn access_policy(&self, vault: &str) -> Option<AccessPolicy> {
        self.state.read().await.policies.get(vault).cloned()
    }

    /// Returns a web app's application settings.
    pub async fn app_settings(&self, web_app: &str) -> Option<HashMap<String, String>> {
        self.state.read().await.app_settings.get(web_app).cloned()
    }

    /// Returns the repository and branch last deployed to a web app.
    pub async fn deployment(&self, web_app: &str) -> Option<(String, String)> {
        self.state.read().await.deployments.get(web_app).cloned()
    }
}

/// Registers the memory provider with the factory.
pub fn register() {
    crate::factory::register_provider(ProviderType::Memory, |_cfg| {
        Ok(Box::new(MemoryProvider::new()))
    });
}
