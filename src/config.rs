//! Configuration types for a deployment run.

use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_REPOSITORY: &str = "https://github.com/Azure-Samples/documentdb-dotnet-todo-app";

/// Cloud provider identifier.
///
/// Each variant corresponds to a [`CloudProvider`](crate::CloudProvider)
/// implementation. Providers must be enabled via Cargo feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    /// In-memory provider for tests and dry runs
    Memory,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = crate::VaultwireError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "mock" => Ok(Self::Memory),
            other => Err(crate::VaultwireError::Other(anyhow::anyhow!(
                "unknown provider type: {} (valid options: memory)",
                other
            ))),
        }
    }
}

/// Configuration for a deployment run.
///
/// Use the builder pattern for ergonomic configuration:
///
/// ```
/// use vaultwire::{DeployConfig, ProviderType};
/// use std::time::Duration;
///
/// let config = DeployConfig::new(ProviderType::Memory)
///     .with_region("westus")
///     .with_prefix("todo")
///     .with_settle_delay(Duration::from_secs(5))
///     .with_option("database", "tododb");
///
/// assert_eq!(config.region, "westus");
/// ```
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Provider type
    pub provider: ProviderType,

    /// Region all resources are created in (default: eastus)
    pub region: String,

    /// Prefix for generated resource names (default: "vwdemo")
    pub prefix: String,

    /// Resource group name; derived from the prefix when absent
    pub resource_group: Option<String>,

    /// Git repository holding the sample application
    pub repository_url: String,

    /// Branch to deploy from
    pub branch: String,

    /// Pause after deployment before tearing down (default: 30 seconds)
    pub settle_delay: Duration,

    /// Leave resources in place instead of deleting the resource group
    pub keep_resources: bool,

    /// Provider-specific options
    pub options: HashMap<String, String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::Memory,
            region: "eastus".to_string(),
            prefix: "vwdemo".to_string(),
            resource_group: None,
            repository_url: DEFAULT_REPOSITORY.to_string(),
            branch: "master".to_string(),
            settle_delay: Duration::from_secs(30),
            keep_resources: false,
            options: HashMap::new(),
        }
    }
}

impl DeployConfig {
    /// Creates a new configuration for the specified provider.
    ///
    /// # Example
    ///
    /// ```
    /// use vaultwire::{DeployConfig, ProviderType};
    ///
    /// let config = DeployConfig::new(ProviderType::Memory);
    /// assert_eq!(config.provider, ProviderType::Memory);
    /// ```
    pub fn new(provider: ProviderType) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    /// Sets the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the resource name prefix.
    ///
    /// Generated names are the prefix followed by a kind tag and a random
    /// suffix, e.g. `todo-kv-1a2b3c4d`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Uses an explicit resource group name instead of a generated one.
    pub fn with_resource_group(mut self, name: impl Into<String>) -> Self {
        self.resource_group = Some(name.into());
        self
    }

    /// Sets the repository and branch of the sample application.
    pub fn with_repository(mut self, url: impl Into<String>, branch: impl Into<String>) -> Self {
        self.repository_url = url.into();
        self.branch = branch.into();
        self
    }

    /// Sets how long to wait after deployment.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Skips the final resource group deletion.
    pub fn with_keep_resources(mut self, keep: bool) -> Self {
        self.keep_resources = keep;
        self
    }

    /// Adds a provider-specific option.
    ///
    /// Common options:
    /// - `database`: database name stored in the vault (default "tododb")
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Gets a provider-specific option value.
    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }
}

/// Names for every resource a deployment creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    /// Resource group
    pub resource_group: String,
    /// Document database account
    pub database_account: String,
    /// Key vault
    pub vault: String,
    /// Web app
    pub web_app: String,
}

impl ResourceNames {
    /// Derives names from the configured prefix with a shared random suffix.
    ///
    /// The prefix is lowercased and stripped to alphanumerics and truncated
    /// so the vault name stays within its 24 character limit.
    pub fn generate(config: &DeployConfig) -> Self {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        let suffix = &uuid[..8];

        let mut stem: String = config
            .prefix
            .to_lowercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(10)
            .collect();
        if !stem.starts_with(|c: char| c.is_ascii_alphabetic()) {
            stem.insert(0, 'v');
        }

        Self {
            resource_group: config
                .resource_group
                .clone()
                .unwrap_or_else(|| format!("rg{}{}", stem, suffix)),
            database_account: format!("{}-db-{}", stem, suffix),
            vault: format!("{}-kv-{}", stem, suffix),
            web_app: format!("{}-web-{}", stem, suffix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation;

    #[test]
    fn test_config_builder() {
        let config = DeployConfig::new(ProviderType::Memory)
            .with_region("westeurope")
            .with_prefix("myapp")
            .with_resource_group("rg-myapp")
            .with_repository("https://example.com/app.git", "main")
            .with_option("database", "appdb")
            .with_settle_delay(Duration::from_secs(1))
            .with_keep_resources(true);

        assert_eq!(config.provider, ProviderType::Memory);
        assert_eq!(config.region, "westeurope");
        assert_eq!(config.prefix, "myapp");
        assert_eq!(config.resource_group.as_deref(), Some("rg-myapp"));
        assert_eq!(config.branch, "main");
        assert_eq!(config.get_option("database"), Some(&"appdb".to_string()));
        assert_eq!(config.settle_delay, Duration::from_secs(1));
        assert!(config.keep_resources);
    }

    #[test]
    fn test_default_config() {
        let config = DeployConfig::default();
        assert_eq!(config.provider, ProviderType::Memory);
        assert_eq!(config.region, "eastus");
        assert_eq!(config.prefix, "vwdemo");
        assert_eq!(config.settle_delay, Duration::from_secs(30));
        assert!(!config.keep_resources);
    }

    #[test]
    fn test_provider_type_parse_and_display() {
        assert_eq!("memory".parse::<ProviderType>().unwrap(), ProviderType::Memory);
        assert_eq!("MOCK".parse::<ProviderType>().unwrap(), ProviderType::Memory);
        assert!("gcp".parse::<ProviderType>().is_err());
        assert_eq!(ProviderType::Memory.to_string(), "memory");
    }

    #[test]
    fn test_generated_names_are_valid() {
        for prefix in ["vwdemo", "My_Very-Long.Application", "123", ""] {
            let config = DeployConfig::default().with_prefix(prefix);
            let names = ResourceNames::generate(&config);

            validation::validate_resource_group_name(&names.resource_group).unwrap();
            validation::validate_account_name(&names.database_account).unwrap();
            validation::validate_vault_name(&names.vault).unwrap();
            validation::validate_web_app_name(&names.web_app).unwrap();
        }
    }

    #[test]
    fn test_explicit_resource_group_kept() {
        let config = DeployConfig::default().with_resource_group("rg-fixed");
        assert_eq!(ResourceNames::generate(&config).resource_group, "rg-fixed");
    }

    #[test]
    fn test_names_differ_between_runs() {
        let config = DeployConfig::default();
        assert_ne!(ResourceNames::generate(&config), ResourceNames::generate(&config));
    }
}
