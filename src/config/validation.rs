//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, intervals > 0)
//! - Check that endpoint URLs and the vault address actually parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ReleaseConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use url::Url;

use crate::config::schema::ReleaseConfig;

/// A single rejected configuration field.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn push(errors: &mut Vec<ValidationError>, field: &str, message: impl Into<String>) {
    errors.push(ValidationError {
        field: field.to_string(),
        message: message.into(),
    });
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.is_empty() {
        push(errors, field, "must not be empty");
    } else if Url::parse(value).is_err() {
        push(errors, field, format!("invalid URL: {}", value));
    }
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ReleaseConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "chain.rpc_url", &config.chain.rpc_url);
    for (i, u) in config.chain.failover_urls.iter().enumerate() {
        check_url(&mut errors, &format!("chain.failover_urls[{}]", i), u);
    }
    if config.chain.rpc_timeout_secs == 0 {
        push(&mut errors, "chain.rpc_timeout_secs", "must be greater than zero");
    }
    if config.chain.seconds_per_block == 0 {
        push(&mut errors, "chain.seconds_per_block", "must be greater than zero");
    }
    if config.chain.confirmation_blocks == 0 {
        push(&mut errors, "chain.confirmation_blocks", "must be at least 1");
    }

    if config.vault.contract_address.parse::<Address>().is_err() {
        push(
            &mut errors,
            "vault.contract_address",
            format!("invalid address: {}", config.vault.contract_address),
        );
    }
    if config.vault.submit_timeout_secs == 0 {
        push(&mut errors, "vault.submit_timeout_secs", "must be greater than zero");
    }

    check_url(&mut errors, "media.api_url", &config.media.api_url);
    check_url(&mut errors, "media.gateway_url", &config.media.gateway_url);
    if config.media.api_key_env.is_empty() {
        push(&mut errors, "media.api_key_env", "must not be empty");
    }
    if config.media.upload_timeout_secs == 0 {
        push(&mut errors, "media.upload_timeout_secs", "must be greater than zero");
    }

    check_url(&mut errors, "sealer.endpoint_url", &config.sealer.endpoint_url);
    if config.sealer.timeout_secs == 0 {
        push(&mut errors, "sealer.timeout_secs", "must be greater than zero");
    }

    if config.store.path.is_empty() {
        push(&mut errors, "store.path", "must not be empty");
    }

    if config.session.display_tick_ms == 0 {
        push(&mut errors, "session.display_tick_ms", "must be greater than zero");
    }
    if config.session.poll_interval_secs == 0 {
        push(&mut errors, "session.poll_interval_secs", "must be greater than zero");
    }

    match config.observability.log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => push(
            &mut errors,
            "observability.log_level",
            format!("unknown log level: {}", other),
        ),
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        push(
            &mut errors,
            "observability.metrics_address",
            format!("invalid socket address: {}", config.observability.metrics_address),
        );
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

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ReleaseConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut config = ReleaseConfig::default();
        config.chain.rpc_url = String::new();
        config.chain.seconds_per_block = 0;
        config.vault.contract_address = "not-an-address".to_string();
        config.session.poll_interval_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.field == "chain.rpc_url"));
        assert!(errors.iter().any(|e| e.field == "chain.seconds_per_block"));
        assert!(errors.iter().any(|e| e.field == "vault.contract_address"));
        assert!(errors.iter().any(|e| e.field == "session.poll_interval_secs"));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ReleaseConfig::default();
        config.observability.metrics_address = "nonsense".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }

    #[test]
    fn test_bad_log_level_is_rejected() {
        let mut config = ReleaseConfig::default();
        config.observability.log_level = "verbose".to_string();
        assert!(validate_config(&config).is_err());
    }
}
