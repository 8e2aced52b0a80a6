//! Input validation for identity fields

use crate::error::{CookbookError, Result};

pub const MAX_DISPLAY_NAME_LEN: usize = 64;
pub const MAX_ADDRESS_LEN: usize = 254;

/// Accepted secret length window, in characters
#[derive(Debug, Clone, Copy)]
pub struct SecretPolicy {
    pub min_len: usize,
    pub max_len: usize,
}

impl SecretPolicy {
    pub fn check(&self, secret: &str) -> Result<()> {
        let len = secret.chars().count();
        if len < self.min_len {
            return Err(CookbookError::Validation(format!(
                "Secret must be at least {} characters long",
                self.min_len
            )));
        }
        if len > self.max_len {
            return Err(CookbookError::Validation(format!(
                "Secret must be at most {} characters long",
                self.max_len
            )));
        }
        Ok(())
    }
}

pub fn display_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CookbookError::Validation("Display name is required".into()));
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(CookbookError::Validation(format!(
            "Display name must be at most {MAX_DISPLAY_NAME_LEN} characters long"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(CookbookError::Validation(
            "Display name contains illegal characters".into(),
        ));
    }
    Ok(())
}

pub fn address(address: &str) -> Result<()> {
    if address.is_empty() || address.len() > MAX_ADDRESS_LEN {
        return Err(CookbookError::Validation(format!(
            "Address must be between 1 and {MAX_ADDRESS_LEN} characters long"
        )));
    }
    if address
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '\'' || c == '"')
    {
        return Err(CookbookError::Validation(
            "Address contains illegal characters".into(),
        ));
    }
    match address.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(CookbookError::Validation("Address is not a valid email".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses() {
        assert!(address("ana@example.com").is_ok());
        assert!(address("Ana.Maria+food@kitchen.io").is_ok());

        for bad in ["", "ana", "@example.com", "ana@", "ana@@example.com", "a b@c.d", "o'neil@x.y"] {
            assert!(address(bad).is_err(), "{bad} should be rejected");
        }
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(address(&long).is_err());
    }

    #[test]
    fn test_display_names() {
        assert!(display_name("Chef Ana").is_ok());
        assert!(display_name("   ").is_err());
        assert!(display_name("tab\there").is_err());
        assert!(display_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_secret_policy() {
        let policy = SecretPolicy {
            min_len: 6,
            max_len: 12,
        };
        assert!(policy.check("123456").is_ok());
        assert!(policy.check("12345").is_err());
        assert!(policy.check("1234567890123").is_err());
        // counted in characters, not bytes
        assert!(policy.check("éééééé").is_ok());
    }
}
