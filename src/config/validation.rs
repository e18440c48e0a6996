//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and address formats
//! - Validate the context path shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::jid::BareJid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.context_path must be empty or start with '/' and not end with '/', got '{0}'")]
    InvalidContextPath(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("security.api_keys[{0}].key must not be empty")]
    EmptyApiKey(usize),

    #[error("security.api_keys[{index}].paths entry '{path}' must start with '/'")]
    InvalidKeyPath { index: usize, path: String },

    #[error("{field}: invalid bare identifier '{value}'")]
    InvalidJid { field: String, value: String },

    #[error("security.users[{0}].password must not be empty")]
    EmptyPassword(usize),
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    let ctx = &config.listener.context_path;
    if !ctx.is_empty() && (!ctx.starts_with('/') || ctx.ends_with('/')) {
        errors.push(ValidationError::InvalidContextPath(ctx.clone()));
    }

    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("listener.max_body_bytes"));
    }
    if config.workers.max_concurrent == 0 {
        errors.push(ValidationError::Zero("workers.max_concurrent"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    for (index, key) in config.security.api_keys.iter().enumerate() {
        if key.key.is_empty() {
            errors.push(ValidationError::EmptyApiKey(index));
        }
        for path in key.paths.iter().filter(|p| !p.starts_with('/')) {
            errors.push(ValidationError::InvalidKeyPath {
                index,
                path: path.clone(),
            });
        }
    }

    for (index, user) in config.security.users.iter().enumerate() {
        if user.jid.parse::<BareJid>().is_err() {
            errors.push(ValidationError::InvalidJid {
                field: format!("security.users[{}].jid", index),
                value: user.jid.clone(),
            });
        }
        if user.password.is_empty() {
            errors.push(ValidationError::EmptyPassword(index));
        }
    }
    for (index, admin) in config.security.admins.iter().enumerate() {
        if admin.parse::<BareJid>().is_err() {
            errors.push(ValidationError::InvalidJid {
                field: format!("security.admins[{}]", index),
                value: admin.clone(),
            });
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ApiKeyConfig, UserConfig};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RouterConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.listener.context_path = "rest/".into();
        config.workers.max_concurrent = 0;
        config.security.api_keys.push(ApiKeyConfig {
            key: String::new(),
            domains: vec![],
            paths: vec!["users".into()],
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::InvalidContextPath("rest/".into())));
        assert!(errors.contains(&ValidationError::Zero("workers.max_concurrent")));
        assert!(errors.contains(&ValidationError::EmptyApiKey(0)));
    }

    #[test]
    fn test_user_and_admin_identifiers() {
        let mut config = RouterConfig::default();
        config.security.users.push(UserConfig {
            jid: "a@b@c".into(),
            password: String::new(),
        });
        config.security.admins.push("root@example.com/desk".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::EmptyPassword(0)));
        assert!(errors.contains(&ValidationError::InvalidJid {
            field: "security.admins[0]".into(),
            value: "root@example.com/desk".into(),
        }));
    }

    #[test]
    fn test_context_path_shapes() {
        let mut config = RouterConfig::default();
        for ok in ["", "/rest", "/a/b"] {
            config.listener.context_path = ok.into();
            assert!(validate_config(&config).is_ok(), "{}", ok);
        }
        for bad in ["/", "rest", "/rest/"] {
            config.listener.context_path = bad.into();
            assert!(validate_config(&config).is_err(), "{}", bad);
        }
    }
}
