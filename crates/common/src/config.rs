// TokenForge - ERC-20 Deployment Toolkit
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Network configuration and signing credential loading.
//!
//! The defaults target the Seismic devnet. Everything a workflow needs to
//! talk to the chain is carried by an explicitly constructed [`NetworkConfig`]
//! rather than ambient globals.

use std::{env, str::FromStr, time::Duration};

use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;
use tracing::debug;

/// JSON-RPC endpoint of the Seismic devnet.
pub const DEFAULT_RPC_URL: &str = "https://node-2.seismicdev.net/rpc";

/// Chain id reported by the Seismic devnet.
pub const DEFAULT_CHAIN_ID: u64 = 5124;

/// Gas ceiling attached to the contract-creation transaction.
pub const DEFAULT_DEPLOY_GAS_LIMIT: u64 = 3_000_000;

/// How long to wait for a receipt before giving up on a transaction.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings shared by the deployment and transfer workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Chain id the endpoint is expected to report
    pub chain_id: u64,
    /// Gas ceiling for the deployment transaction
    pub deploy_gas_limit: u64,
    /// Maximum time spent waiting for a single receipt
    pub confirmation_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            deploy_gas_limit: DEFAULT_DEPLOY_GAS_LIMIT,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }
}

impl NetworkConfig {
    /// Replace the RPC endpoint.
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Replace the expected chain id.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Replace the receipt timeout.
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The signing key variable is unset or empty
    #[error("environment variable {0} is not set; export the deployer's private key")]
    MissingCredential(&'static str),

    /// The signing key variable does not hold a valid secp256k1 secret
    #[error("environment variable {var} does not contain a valid private key: {reason}")]
    InvalidCredential {
        /// Name of the offending variable
        var: &'static str,
        /// Parser error message
        reason: String,
    },
}

/// Load the deployer's signer from [`crate::env::PRIVATE_KEY`].
pub fn load_signer() -> Result<PrivateKeySigner, ConfigError> {
    load_signer_from(crate::env::PRIVATE_KEY)
}

/// Load a signer from the named environment variable.
pub fn load_signer_from(var: &'static str) -> Result<PrivateKeySigner, ConfigError> {
    let raw = env::var(var).unwrap_or_default();
    let signer = parse_signer(var, &raw)?;
    debug!(account = %signer.address(), "loaded signer from {var}");
    Ok(signer)
}

/// Parse a hex-encoded private key. Surrounding whitespace and a `0x` prefix are accepted.
pub fn parse_signer(var: &'static str, raw: &str) -> Result<PrivateKeySigner, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::MissingCredential(var));
    }

    PrivateKeySigner::from_str(raw)
        .map_err(|e| ConfigError::InvalidCredential { var, reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use serial_test::serial;

    // First anvil development account.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_default_targets_devnet() {
        let config = NetworkConfig::default();
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(config.deploy_gas_limit, 3_000_000);
    }

    #[test]
    fn test_builder_overrides() {
        let config = NetworkConfig::default()
            .with_rpc_url("http://127.0.0.1:8545")
            .with_chain_id(31337)
            .with_confirmation_timeout(Duration::from_secs(5));
        assert_eq!(config.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.chain_id, 31337);
        assert_eq!(config.confirmation_timeout, Duration::from_secs(5));
        assert_eq!(config.deploy_gas_limit, DEFAULT_DEPLOY_GAS_LIMIT);
    }

    #[test]
    fn test_parse_signer_with_and_without_prefix() {
        let expected: Address = DEV_ADDRESS.parse().unwrap();
        let prefixed = parse_signer("KEY", DEV_KEY).unwrap();
        let bare = parse_signer("KEY", DEV_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(prefixed.address(), expected);
        assert_eq!(bare.address(), expected);
    }

    #[test]
    fn test_parse_signer_rejects_empty_and_garbage() {
        assert!(matches!(parse_signer("KEY", "  "), Err(ConfigError::MissingCredential("KEY"))));
        assert!(matches!(
            parse_signer("KEY", "0xnothex"),
            Err(ConfigError::InvalidCredential { var: "KEY", .. })
        ));
    }

    #[test]
    #[serial]
    fn test_load_signer_from_env() {
        const VAR: &str = "TOKENFORGE_TEST_SIGNER_KEY";

        env::remove_var(VAR);
        assert!(matches!(load_signer_from(VAR), Err(ConfigError::MissingCredential(VAR))));

        env::set_var(VAR, DEV_KEY);
        let signer = load_signer_from(VAR).unwrap();
        assert_eq!(signer.address(), DEV_ADDRESS.parse::<Address>().unwrap());
        env::remove_var(VAR);
    }
}
