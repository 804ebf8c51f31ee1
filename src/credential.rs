//! Service-principal credentials built from an auth file mapping.

use crate::auth_file::CredentialMap;
use crate::{Result, VaultwireError};

const CLIENT_ID: &str = "clientId";
const CLIENT_SECRET: &str = "clientSecret";
const TENANT_ID: &str = "tenantId";

/// A non-interactive identity: client id, client secret and an optional
/// tenant id.
///
/// Extraction never fails. Missing fields come back empty (or `None` for the
/// tenant), so callers that need a complete credential should call
/// [`validate`](Self::validate) before authenticating with it.
///
/// # Example
///
/// ```
/// use vaultwire::auth_file::parse_auth_str;
/// use vaultwire::ServicePrincipalCredential;
///
/// let map = parse_auth_str("clientId=abc\nclientSecret=xyz\n")?;
/// let credential = ServicePrincipalCredential::from_map(&map);
///
/// assert_eq!(credential.client_id(), "abc");
/// assert_eq!(credential.tenant_id(), None);
/// # Ok::<(), vaultwire::VaultwireError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ServicePrincipalCredential {
    client_id: String,
    client_secret: String,
    tenant_id: Option<String>,
}

impl ServicePrincipalCredential {
    /// Creates a credential from explicit values.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: Option<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant_id,
        }
    }

    /// Pulls `clientId`, `clientSecret` and `tenantId` out of `map`.
    pub fn from_map(map: &CredentialMap) -> Self {
        let field = |key: &str| map.get(key).cloned().unwrap_or_default();

        Self {
            client_id: field(CLIENT_ID),
            client_secret: field(CLIENT_SECRET),
            tenant_id: map.get(TENANT_ID).cloned(),
        }
    }

    /// Client (application) id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client secret.
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Tenant id, if the auth file had one.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Checks that the client id and secret are present.
    ///
    /// # Errors
    ///
    /// Returns [`VaultwireError::MissingCredential`] naming the first empty
    /// field.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(VaultwireError::MissingCredential(CLIENT_ID.to_string()));
        }
        if self.client_secret.is_empty() {
            return Err(VaultwireError::MissingCredential(CLIENT_SECRET.to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ServicePrincipalCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePrincipalCredential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> CredentialMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_full_map() {
        let cred = ServicePrincipalCredential::from_map(&map(&[
            ("clientId", "abc"),
            ("clientSecret", "xyz"),
            ("tenantId", "t1"),
            ("subscriptionId", "ignored"),
        ]));

        assert_eq!(cred.client_id(), "abc");
        assert_eq!(cred.client_secret(), "xyz");
        assert_eq!(cred.tenant_id(), Some("t1"));
        assert!(cred.validate().is_ok());
    }

    #[test]
    fn test_missing_tenant() {
        let fields = map(&[("clientId", "abc"), ("clientSecret", "xyz")]);
        let cred = ServicePrincipalCredential::from_map(&fields);

        assert_eq!(cred.tenant_id(), None);
        assert!(cred.validate().is_ok());
    }

    #[test]
    fn test_empty_map_never_fails() {
        let cred = ServicePrincipalCredential::from_map(&CredentialMap::new());

        assert_eq!(cred.client_id(), "");
        assert_eq!(cred.client_secret(), "");
        assert_eq!(cred.tenant_id(), None);
    }

    #[test]
    fn test_keys_are_exact() {
        let fields = map(&[("clientid", "abc"), ("client", "x")]);
        let cred = ServicePrincipalCredential::from_map(&fields);
        assert_eq!(cred.client_id(), "");
    }

    #[test]
    fn test_validate_reports_field() {
        let err = ServicePrincipalCredential::new("abc", "", None)
            .validate()
            .unwrap_err();
        assert!(matches!(err, VaultwireError::MissingCredential(ref f) if f == "clientSecret"));

        let err = ServicePrincipalCredential::new("", "xyz", None)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("clientId"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let cred = ServicePrincipalCredential::new("abc", "super-secret", Some("t1".to_string()));
        let debug = format!("{:?}", cred);
        assert!(debug.contains("abc"));
        assert!(!debug.contains("super-secret"));
    }
}
