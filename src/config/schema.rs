//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! release engine. All types derive Serde traits for deserialization
//! from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the release engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Ledger connection settings.
    pub chain: ChainConfig,

    /// Time-lock vault contract settings.
    pub vault: VaultConfig,

    /// Content-addressed media storage settings.
    pub media: MediaConfig,

    /// Time-lock sealing service settings.
    pub sealer: SealerConfig,

    /// Release record persistence settings.
    pub store: StoreConfig,

    /// Viewer session timing settings.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (314159 for Filecoin Calibration).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required for a submitted request.
    pub confirmation_blocks: u32,

    /// Average block production interval in seconds.
    pub seconds_per_block: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.calibration.node.glif.io/rpc/v1".to_string(),
            failover_urls: Vec::new(),
            chain_id: 314_159,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            seconds_per_block: 30,
        }
    }
}

/// Time-lock vault contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Address of the vault contract holding sealed requests.
    pub contract_address: String,

    /// Total time allowed for submission plus confirmation, in seconds.
    pub submit_timeout_secs: u64,

    /// Base URL for linking submitted transactions in a block explorer.
    pub explorer_base_url: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            contract_address: "0xcF04a63AedF2B4d83f3fFA40b523694df0e8F6C9".to_string(),
            submit_timeout_secs: 120,
            explorer_base_url: "https://calibration.filfox.info/en/message".to_string(),
        }
    }
}

/// Content-addressed media storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Upload API endpoint.
    pub api_url: String,

    /// Public gateway base URL for retrieving uploaded content.
    pub gateway_url: String,

    /// Environment variable holding the storage API key.
    pub api_key_env: String,

    /// Upload timeout in seconds.
    pub upload_timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            api_url: "https://node.lighthouse.storage/api/v0/add".to_string(),
            gateway_url: "https://gateway.lighthouse.storage/ipfs".to_string(),
            api_key_env: "BLOCKDROP_STORAGE_KEY".to_string(),
            upload_timeout_secs: 60,
        }
    }
}

/// Time-lock sealing service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SealerConfig {
    /// Sealing service endpoint URL.
    pub endpoint_url: String,

    /// Sealing request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SealerConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://127.0.0.1:8787/seal".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Release record persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the release record file.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "releases.json".to_string(),
        }
    }
}

/// Viewer session timing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Local countdown tick interval in milliseconds.
    pub display_tick_ms: u64,

    /// Ledger height polling interval in seconds.
    pub poll_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            display_tick_ms: 1_000,
            poll_interval_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9091".to_string(),
        }
    }
}
