//! The provision, wire, deploy and tear down sequence.
//!
//! A [`Deployment`] walks through a fixed list of steps against a
//! [`CloudProvider`]:
//!
//! 1. sign in with the service principal
//! 2. create a resource group
//! 3. create a document database account and read its keys
//! 4. create a key vault the service principal may read and write
//! 5. store the database endpoint, key and name as vault secrets
//! 6. create a web app whose settings point at the vault and carry the
//!    service principal credentials
//! 7. deploy the sample application and wait for it to settle
//!
//! The resource group is then deleted, whether or not the steps succeeded.
//! A failed deletion is logged and never replaces the error that stopped
//! the run.

use crate::config::ResourceNames;
use crate::resource::{DEFAULT_HOST_NAME, VAULT_URI};
use crate::{
    AccessPolicy, CloudProvider, DeployConfig, Resource, Result, ServicePrincipalCredential,
    VaultwireError,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Vault secret holding the database endpoint.
pub const SECRET_DOCUMENTDB_URI: &str = "azure-documentdb-uri";
/// Vault secret holding the database primary key.
pub const SECRET_DOCUMENTDB_KEY: &str = "azure-documentdb-key";
/// Vault secret holding the database name.
pub const SECRET_DOCUMENTDB_DATABASE: &str = "azure-documentdb-database";

/// App setting with the vault URI.
pub const SETTING_VAULT_URI: &str = "AZURE_KEYVAULT_URI";
/// App setting with the service principal client id.
pub const SETTING_CLIENT_ID: &str = "AZURE_KEYVAULT_CLIENT_ID";
/// App setting with the service principal secret.
pub const SETTING_CLIENT_KEY: &str = "AZURE_KEYVAULT_CLIENT_KEY";
/// App setting with the tenant id, set only when the credential has one.
pub const SETTING_TENANT_ID: &str = "AZURE_KEYVAULT_TENANT_ID";

const DEFAULT_DATABASE: &str = "tododb";

/// What happened to the resource group at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum CleanupStatus {
    /// Resource group deleted
    Deleted,
    /// Deletion skipped because `keep_resources` was set
    Kept,
    /// Nothing was created, so nothing was deleted
    Skipped,
    /// Deletion failed; resources may still exist
    Failed(String),
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    /// Provider the run used
    pub provider: String,
    /// Resource group that held everything
    pub resource_group: String,
    /// Resources in creation order, resource group first
    pub resources: Vec<Resource>,
    /// Public URL of the deployed web app
    pub web_app_url: String,
    /// Outcome of the teardown
    pub cleanup: CleanupStatus,
}

impl DeploymentReport {
    /// Renders the report as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One run of the demo deployment.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use vaultwire::providers::memory::MemoryProvider;
/// use vaultwire::{DeployConfig, Deployment, ProviderType, ServicePrincipalCredential};
///
/// #[tokio::main]
/// async fn main() -> vaultwire::Result<()> {
///     let config = DeployConfig::new(ProviderType::Memory).with_settle_delay(Duration::ZERO);
///     let credential = ServicePrincipalCredential::new("abc", "xyz", None);
///
///     let mut deployment = Deployment::new(Box::new(MemoryProvider::new()), config, credential);
///     let report = deployment.run().await?;
///
///     assert!(report.web_app_url.starts_with("https://"));
///     Ok(())
/// }
/// ```
pub struct Deployment {
    provider: Box<dyn CloudProvider>,
    provider_name: String,
    config: DeployConfig,
    credential: ServicePrincipalCredential,
    names: ResourceNames,
    created: Vec<Resource>,
    group_created: bool,
}

impl Deployment {
    /// Prepares a run; resource names are generated here.
    pub fn new(
        provider: Box<dyn CloudProvider>,
        config: DeployConfig,
        credential: ServicePrincipalCredential,
    ) -> Self {
        let names = ResourceNames::generate(&config);
        let provider_name = provider.name().to_string();
        Self {
            provider,
            provider_name,
            config,
            credential,
            names,
            created: Vec::new(),
            group_created: false,
        }
    }

    /// Names this run will use.
    pub fn names(&self) -> &ResourceNames {
        &self.names
    }

    /// Runs every step, then tears down.
    ///
    /// # Errors
    ///
    /// Returns the first provider failure, wrapped as
    /// [`VaultwireError::ProviderOperation`]. Teardown still runs in that
    /// case.
    pub async fn run(&mut self) -> Result<DeploymentReport> {
        self.created.clear();
        info!(
            provider = %self.provider_name,
            resource_group = %self.names.resource_group,
            region = %self.config.region,
            "starting deployment"
        );

        let outcome = self.provision().await;
        if let Err(ref err) = outcome {
            warn!(error = %err, "deployment failed, cleaning up");
        }

        let cleanup = if self.config.keep_resources {
            info!(resource_group = %self.names.resource_group, "keeping resources");
            CleanupStatus::Kept
        } else {
            self.cleanup().await
        };

        let web_app_url = outcome?;
        Ok(DeploymentReport {
            provider: self.provider_name.clone(),
            resource_group: self.names.resource_group.clone(),
            resources: self.created.clone(),
            web_app_url,
            cleanup,
        })
    }

    /// Deletes the resource group if this run created it.
    ///
    /// Never fails; a deletion error is logged and reported as
    /// [`CleanupStatus::Failed`].
    pub async fn cleanup(&mut self) -> CleanupStatus {
        if !self.group_created {
            debug!("nothing to clean up");
            return CleanupStatus::Skipped;
        }

        let group = self.names.resource_group.clone();
        info!(resource_group = %group, "deleting resource group");
        match self.provider.delete_resource_group(&group).await {
            Ok(()) => {
                self.group_created = false;
                info!(resource_group = %group, "resource group deleted");
                CleanupStatus::Deleted
            }
            Err(err) => {
                let err = self.wrap("delete", &group, err);
                warn!(error = %err, "cleanup failed, resources may still exist");
                CleanupStatus::Failed(err.to_string())
            }
        }
    }

    async fn provision(&mut self) -> Result<String> {
        let names = self.names.clone();
        let region = self.config.region.clone();

        self.provider
            .authenticate(&self.credential)
            .await
            .map_err(|e| self.wrap("authenticate", self.credential.client_id(), e))?;
        info!(client_id = %self.credential.client_id(), "authenticated");

        let group = self
            .provider
            .create_resource_group(&names.resource_group, &region)
            .await
            .map_err(|e| self.wrap("create", &names.resource_group, e))?;
        self.group_created = true;
        self.record(group);

        let account = self
            .provider
            .create_document_db(&names.resource_group, &names.database_account, &region)
            .await
            .map_err(|e| self.wrap("create", &names.database_account, e))?;
        self.record(account);

        let keys = self
            .provider
            .list_database_keys(&names.resource_group, &names.database_account)
            .await
            .map_err(|e| self.wrap("list keys", &names.database_account, e))?;
        debug!(endpoint = %keys.endpoint, "read database keys");

        let policy = AccessPolicy::full_secret_access(
            self.credential.tenant_id().unwrap_or_default(),
            self.credential.client_id(),
        );
        let vault = self
            .provider
            .create_key_vault(&names.resource_group, &names.vault, &region, policy)
            .await
            .map_err(|e| self.wrap("create", &names.vault, e))?;
        let vault_uri = vault.property(VAULT_URI).unwrap_or_default().to_string();
        self.record(vault.clone());

        let database = self
            .config
            .get_option("database")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let secrets = [
            (SECRET_DOCUMENTDB_URI, keys.endpoint.as_str()),
            (SECRET_DOCUMENTDB_KEY, keys.primary_master_key.as_str()),
            (SECRET_DOCUMENTDB_DATABASE, database.as_str()),
        ];
        for (name, value) in secrets {
            let secret = self
                .provider
                .set_secret(&vault, name, value)
                .await
                .map_err(|e| self.wrap("set secret", name, e))?;
            self.record(secret);
        }

        let settings = self.app_settings(&vault_uri);
        let web_app = self
            .provider
            .create_web_app(&names.resource_group, &names.web_app, &region, settings)
            .await
            .map_err(|e| self.wrap("create", &names.web_app, e))?;
        let host = web_app
            .property(DEFAULT_HOST_NAME)
            .unwrap_or(names.web_app.as_str())
            .to_string();
        self.record(web_app.clone());

        info!(
            repository = %self.config.repository_url,
            branch = %self.config.branch,
            web_app = %names.web_app,
            "deploying sample application"
        );
        self.provider
            .deploy_source(&web_app, &self.config.repository_url, &self.config.branch)
            .await
            .map_err(|e| self.wrap("deploy", &names.web_app, e))?;

        let web_app_url = format!("https://{}", host);
        info!(url = %web_app_url, "web app deployed");

        if !self.config.settle_delay.is_zero() {
            debug!(delay = ?self.config.settle_delay, "waiting for the app to settle");
            tokio::time::sleep(self.config.settle_delay).await;
        }

        Ok(web_app_url)
    }

    fn app_settings(&self, vault_uri: &str) -> HashMap<String, String> {
        let mut settings = HashMap::from([
            (SETTING_VAULT_URI.to_string(), vault_uri.to_string()),
            (
                SETTING_CLIENT_ID.to_string(),
                self.credential.client_id().to_string(),
            ),
            (
                SETTING_CLIENT_KEY.to_string(),
                self.credential.client_secret().to_string(),
            ),
        ]);
        if let Some(tenant) = self.credential.tenant_id() {
            settings.insert(SETTING_TENANT_ID.to_string(), tenant.to_string());
        }
        settings
    }

    fn record(&mut self, resource: Resource) {
        info!(kind = %resource.kind, name = %resource.name, "created");
        self.created.push(resource);
    }

    fn wrap(&self, operation: &str, resource: &str, err: VaultwireError) -> VaultwireError {
        VaultwireError::provider_op(&self.provider_name, operation, resource, err)
    }
}
