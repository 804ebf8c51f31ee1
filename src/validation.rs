//! Resource name validation.
//!
//! Each resource kind has its own naming rules. Names are checked before
//! any provider call so a bad prefix fails fast instead of halfway through a
//! deployment.

use crate::{Result, VaultwireError};

/// Validates a resource group name.
///
/// 1 to 90 characters: alphanumerics, `-`, `_`, `.`, `(` and `)`. May not
/// end with a period.
///
/// # Example
///
/// ```
/// use vaultwire::validation::validate_resource_group_name;
///
/// assert!(validate_resource_group_name("rg-demo_01").is_ok());
/// assert!(validate_resource_group_name("rg.").is_err());
/// assert!(validate_resource_group_name("rg; rm -rf /").is_err());
/// ```
pub fn validate_resource_group_name(name: &str) -> Result<()> {
    check_length("resource group", name, 1, 90)?;

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')'))
    {
        return Err(invalid(
            "resource group",
            name,
            "may only contain alphanumerics, '-', '_', '.', '(' and ')'",
        ));
    }

    if name.ends_with('.') {
        return Err(invalid("resource group", name, "cannot end with a period"));
    }

    Ok(())
}

/// Validates a document database account name.
///
/// 3 to 44 characters: lowercase letters, digits and hyphens, not starting
/// or ending with a hyphen.
pub fn validate_account_name(name: &str) -> Result<()> {
    check_length("database account", name, 3, 44)?;

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid(
            "database account",
            name,
            "may only contain lowercase letters, digits and hyphens",
        ));
    }

    check_hyphen_edges("database account", name)
}

/// Validates a key vault name.
///
/// 3 to 24 characters: letters, digits and hyphens. Must start with a
/// letter, end with a letter or digit, and contain no consecutive hyphens.
pub fn validate_vault_name(name: &str) -> Result<()> {
    check_length("vault", name, 3, 24)?;
    check_alnum_hyphen("vault", name)?;

    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid("vault", name, "must start with a letter"));
    }
    if name.ends_with('-') {
        return Err(invalid("vault", name, "must end with a letter or digit"));
    }
    if name.contains("--") {
        return Err(invalid("vault", name, "cannot contain consecutive hyphens"));
    }

    Ok(())
}

/// Validates a web app name.
///
/// 2 to 60 characters: letters, digits and hyphens, not starting or ending
/// with a hyphen.
pub fn validate_web_app_name(name: &str) -> Result<()> {
    check_length("web app", name, 2, 60)?;
    check_alnum_hyphen("web app", name)?;
    check_hyphen_edges("web app", name)
}

/// Validates a vault secret name.
///
/// 1 to 127 characters: letters, digits and hyphens.
pub fn validate_secret_name(name: &str) -> Result<()> {
    check_length("secret", name, 1, 127)?;
    check_alnum_hyphen("secret", name)
}

fn check_length(kind: &str, name: &str, min: usize, max: usize) -> Result<()> {
    let len = name.chars().count();
    if len < min || len > max {
        return Err(invalid(
            kind,
            name,
            &format!("must be between {} and {} characters", min, max),
        ));
    }
    Ok(())
}

fn check_alnum_hyphen(kind: &str, name: &str) -> Result<()> {
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid(
            kind,
            name,
            "may only contain letters, digits and hyphens",
        ));
    }
    Ok(())
}

fn check_hyphen_edges(kind: &str, name: &str) -> Result<()> {
    if name.starts_with('-') || name.ends_with('-') {
        return Err(invalid(kind, name, "cannot start or end with a hyphen"));
    }
    Ok(())
}

fn invalid(kind: &str, name: &str, reason: &str) -> VaultwireError {
    VaultwireError::InvalidResourceName(format!("{} name '{}' {}", kind, name, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_resource_group_name("rg-vwdemo(prod).1").is_ok());
        assert!(validate_account_name("todo-db-1a2b3c4d").is_ok());
        assert!(validate_vault_name("todo-kv-1a2b3c4d").is_ok());
        assert!(validate_web_app_name("Todo-Web-01").is_ok());
        assert!(validate_secret_name("azure-documentdb-key").is_ok());
    }

    #[test]
    fn test_length_limits() {
        assert!(validate_resource_group_name("").is_err());
        assert!(validate_resource_group_name(&"a".repeat(91)).is_err());
        assert!(validate_account_name("ab").is_err());
        assert!(validate_account_name(&"a".repeat(45)).is_err());
        assert!(validate_vault_name(&"a".repeat(25)).is_err());
        assert!(validate_web_app_name("a").is_err());
        assert!(validate_secret_name(&"a".repeat(128)).is_err());

        let err = validate_vault_name("ab").unwrap_err();
        assert!(err.to_string().contains("between 3 and 24"));
    }

    #[test]
    fn test_account_name_rules() {
        assert!(validate_account_name("Uppercase").is_err());
        assert!(validate_account_name("-leading").is_err());
        assert!(validate_account_name("trailing-").is_err());
        assert!(validate_account_name("under_score").is_err());
    }

    #[test]
    fn test_vault_name_rules() {
        assert!(validate_vault_name("1vault").is_err());
        assert!(validate_vault_name("vault-").is_err());
        assert!(validate_vault_name("my--vault").is_err());
        assert!(validate_vault_name("my_vault").is_err());
    }

    #[test]
    fn test_injection_attempts() {
        for name in ["rg; rm -rf /", "rg$(whoami)", "rg`id`", "rg|cat"] {
            let result = validate_resource_group_name(name);
            assert!(result.is_err(), "Expected '{}' to fail validation", name);
        }
        assert!(validate_secret_name("key/../other").is_err());
    }
}
