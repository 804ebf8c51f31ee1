//! End-to-end tests: auth file on disk, credential extraction, and a full
//! deployment against the in-memory provider.
//!
//! Run with:
//!   cargo test --test deployment

#![cfg(feature = "memory")]

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use vaultwire::auth_file::parse_auth_file;
use vaultwire::providers::memory::MemoryProvider;
use vaultwire::workflow::{
    SECRET_DOCUMENTDB_DATABASE, SECRET_DOCUMENTDB_KEY, SECRET_DOCUMENTDB_URI, SETTING_CLIENT_ID,
    SETTING_CLIENT_KEY, SETTING_TENANT_ID, SETTING_VAULT_URI,
};
use vaultwire::{
    factory, CleanupStatus, DeployConfig, Deployment, ProviderType, SecretPermission,
    ServicePrincipalCredential,
};

fn write_auth_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write auth file");
    file
}

fn test_config() -> DeployConfig {
    DeployConfig::new(ProviderType::Memory)
        .with_prefix("it")
        .with_repository("https://example.com/todo-app.git", "main")
        .with_option("database", "itdb")
        .with_settle_delay(Duration::ZERO)
}

#[tokio::test]
async fn test_json_auth_file_to_wired_web_app() {
    let file = write_auth_file(
        r#"{
  "clientId": "11111111-aaaa",
  "clientSecret": "s3cr=t",
  "tenantId": "tenant-1",
  "subscriptionId": "sub-1"
}"#,
    );

    let map = parse_auth_file(file.path()).expect("Failed to parse auth file");
    let credential = ServicePrincipalCredential::from_map(&map);
    credential.validate().expect("Credential should be complete");

    let provider = MemoryProvider::new();
    let handle = provider.handle();

    let mut deployment = Deployment::new(
        Box::new(provider),
        test_config().with_keep_resources(true),
        credential,
    );
    let names = deployment.names().clone();
    let report = deployment.run().await.expect("Deployment failed");
    assert_eq!(report.cleanup, CleanupStatus::Kept);

    let vault_uri = format!("https://{}.vault.azure.net/", names.vault);
    let settings = handle
        .app_settings(&names.web_app)
        .await
        .expect("Web app should exist");
    assert_eq!(settings[SETTING_VAULT_URI], vault_uri);
    assert_eq!(settings[SETTING_CLIENT_ID], "11111111-aaaa");
    assert_eq!(settings[SETTING_CLIENT_KEY], "s3cr=t");
    assert_eq!(settings[SETTING_TENANT_ID], "tenant-1");

    let endpoint = handle
        .secret(&names.vault, SECRET_DOCUMENTDB_URI)
        .await
        .expect("Endpoint secret missing");
    assert_eq!(
        endpoint,
        format!("https://{}.documents.azure.com:443/", names.database_account)
    );
    assert!(handle
        .secret(&names.vault, SECRET_DOCUMENTDB_KEY)
        .await
        .is_some());
    assert_eq!(
        handle
            .secret(&names.vault, SECRET_DOCUMENTDB_DATABASE)
            .await
            .as_deref(),
        Some("itdb")
    );

    let policy = handle
        .access_policy(&names.vault)
        .await
        .expect("Vault policy missing");
    assert_eq!(policy.client_id, "11111111-aaaa");
    assert_eq!(policy.tenant_id, "tenant-1");
    assert!(policy.allows(SecretPermission::Get));

    assert_eq!(
        handle.deployment(&names.web_app).await,
        Some((
            "https://example.com/todo-app.git".to_string(),
            "main".to_string()
        ))
    );
}

#[tokio::test]
async fn test_line_auth_file_through_factory() {
    let file = write_auth_file("# sp for demo\nclientId=abc123\nclientSecret=xyz\nbadline\n");
    let map = parse_auth_file(file.path()).expect("Failed to parse auth file");
    let credential = ServicePrincipalCredential::from_map(&map);
    assert_eq!(credential.tenant_id(), None);

    let config = test_config();
    let provider = factory::new_provider(config.clone()).expect("Failed to create provider");
    let report = Deployment::new(provider, config, credential)
        .run()
        .await
        .expect("Deployment failed");

    assert_eq!(report.provider, "memory");
    assert_eq!(report.cleanup, CleanupStatus::Deleted);
    assert_eq!(report.resources.len(), 7);

    let json = serde_json::to_value(&report).expect("Report should serialize");
    assert_eq!(json["cleanup"]["status"], "deleted");
    assert!(json["web_app_url"]
        .as_str()
        .is_some_and(|url| url.ends_with(".azurewebsites.net")));
}

#[tokio::test]
async fn test_incomplete_credential_fails_before_provisioning() {
    let file = write_auth_file("clientId=abc123\n");
    let map = parse_auth_file(file.path()).expect("Failed to parse auth file");
    let credential = ServicePrincipalCredential::from_map(&map);
    assert!(credential.validate().is_err());

    let provider = MemoryProvider::new();
    let handle = provider.handle();
    let mut deployment = Deployment::new(Box::new(provider), test_config(), credential);
    let group = deployment.names().resource_group.clone();

    assert!(deployment.run().await.is_err());
    assert!(!handle.has_resource_group(&group).await);
}

#[test]
fn test_missing_and_malformed_auth_files() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let err = parse_auth_file(dir.path().join("absent.azureauth")).unwrap_err();
    assert!(err.is_file_not_found());

    let file = write_auth_file("{\n\"clientId\": \n");
    let err = parse_auth_file(file.path()).unwrap_err();
    assert!(err.is_parse());
}
