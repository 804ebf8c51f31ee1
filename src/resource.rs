//! Resource data structures returned by providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Property key holding a vault's URI.
pub const VAULT_URI: &str = "vault_uri";
/// Property key holding a web app's host name.
pub const DEFAULT_HOST_NAME: &str = "default_host_name";
/// Property key holding a database account's document endpoint.
pub const DOCUMENT_ENDPOINT: &str = "document_endpoint";

/// A resource created by a provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Provider-assigned identifier
    pub id: String,

    /// Resource name
    pub name: String,

    /// Resource kind
    #[serde(rename = "type")]
    pub kind: ResourceKind,

    /// Owning resource group
    pub resource_group: String,

    /// Region
    pub region: String,

    /// Kind-specific properties (vault URI, host name, ...)
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub properties: HashMap<String, String>,

    /// When the resource was created
    pub created: DateTime<Utc>,
}

impl Resource {
    /// Creates a resource record with an ARM-style id.
    ///
    /// # Example
    ///
    /// ```
    /// use vaultwire::{Resource, ResourceKind};
    ///
    /// let vault = Resource::new(ResourceKind::KeyVault, "demo-kv", "rg-demo", "eastus");
    /// assert!(vault.id.ends_with("/keyvault/demo-kv"));
    /// ```
    pub fn new(
        kind: ResourceKind,
        name: impl Into<String>,
        resource_group: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let resource_group = resource_group.into();
        Self {
            id: format!("/resourceGroups/{}/{}/{}", resource_group, kind, name),
            name,
            kind,
            resource_group,
            region: region.into(),
            properties: HashMap::new(),
            created: Utc::now(),
        }
    }

    /// Adds a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Gets a property value.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Kind of provisioned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Container for everything else
    ResourceGroup,
    /// Document database account
    DocumentDbAccount,
    /// Secrets vault
    KeyVault,
    /// Secret stored in a vault
    Secret,
    /// Hosted web application
    WebApp,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResourceGroup => write!(f, "resourcegroup"),
            Self::DocumentDbAccount => write!(f, "documentdbaccount"),
            Self::KeyVault => write!(f, "keyvault"),
            Self::Secret => write!(f, "secret"),
            Self::WebApp => write!(f, "webapp"),
        }
    }
}

/// Connection details of a document database account.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseKeys {
    /// Document endpoint URL
    pub endpoint: String,
    /// Primary master key
    pub primary_master_key: String,
    /// Secondary master key
    pub secondary_master_key: String,
}

impl std::fmt::Debug for DatabaseKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseKeys")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Secret permissions a vault grants to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretPermission {
    /// Read a secret value
    Get,
    /// Enumerate secrets
    List,
    /// Write a secret value
    Set,
    /// Remove a secret
    Delete,
}

/// Vault access policy for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Tenant the identity belongs to (empty when unknown)
    pub tenant_id: String,
    /// Client id of the service principal
    pub client_id: String,
    /// Granted secret permissions
    pub secret_permissions: Vec<SecretPermission>,
}

impl AccessPolicy {
    /// Grants get, list, set and delete on secrets.
    pub fn full_secret_access(tenant_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            secret_permissions: vec![
                SecretPermission::Get,
                SecretPermission::List,
                SecretPermission::Set,
                SecretPermission::Delete,
            ],
        }
    }

    /// Returns true if the policy grants `permission`.
    pub fn allows(&self, permission: SecretPermission) -> bool {
        self.secret_permissions.contains(&permission)
    }
}
