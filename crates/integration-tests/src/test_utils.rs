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

//! Test utilities for integration tests

use alloy_signer_local::PrivateKeySigner;
use tokenforge_common::{parse_signer, NetworkConfig};

/// First account of anvil's default `test test ... junk` mnemonic.
pub const DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Initialization utilities for tests
pub mod init {
    /// Initialize logging for a test
    pub fn init_test_environment() {
        tokenforge_common::logging::ensure_test_logging(None);
    }
}

/// Signer holding anvil's pre-funded balance.
pub fn dev_signer() -> PrivateKeySigner {
    parse_signer("DEV_PRIVATE_KEY", DEV_PRIVATE_KEY).expect("valid dev key")
}

/// Local anvil process management
pub mod anvil {
    use std::{
        env,
        net::{TcpListener, TcpStream},
        process::{Child, Command, Stdio},
        time::Duration,
    };

    use eyre::{bail, Result, WrapErr};
    use tokio::time::sleep;
    use tracing::info;

    use super::*;
    use tokenforge_common::{env::TOKENFORGE_TEST_ANVIL_PATH, DEFAULT_CHAIN_ID};

    const STARTUP_ATTEMPTS: usize = 100;

    /// A running anvil node, killed on drop.
    #[derive(Debug)]
    pub struct AnvilNode {
        child: Child,
        port: u16,
    }

    impl AnvilNode {
        /// Start anvil on a free local port, reporting the devnet chain id.
        ///
        /// The binary is taken from `TOKENFORGE_TEST_ANVIL_PATH`, falling back
        /// to `anvil` on the `PATH`.
        pub async fn spawn() -> Result<Self> {
            let port = free_port()?;
            let program =
                env::var(TOKENFORGE_TEST_ANVIL_PATH).unwrap_or_else(|_| "anvil".to_string());

            info!(port, program = %program, "Starting Anvil process");
            let child = Command::new(&program)
                .arg("--port")
                .arg(port.to_string())
                .arg("--chain-id")
                .arg(DEFAULT_CHAIN_ID.to_string())
                .arg("--mnemonic")
                .arg("test test test test test test test test test test test junk")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .wrap_err_with(|| format!("failed to start {program}"))?;

            let node = Self { child, port };
            node.wait_ready().await?;
            info!(port, "Anvil process ready");
            Ok(node)
        }

        /// HTTP endpoint of the node.
        pub fn endpoint(&self) -> String {
            format!("http://127.0.0.1:{}", self.port)
        }

        /// Network settings pointing at this node.
        pub fn network(&self) -> NetworkConfig {
            NetworkConfig::default()
                .with_rpc_url(self.endpoint())
                .with_confirmation_timeout(Duration::from_secs(30))
        }

        async fn wait_ready(&self) -> Result<()> {
            for _ in 0..STARTUP_ATTEMPTS {
                if TcpStream::connect(("127.0.0.1", self.port)).is_ok() {
                    return Ok(());
                }
                sleep(Duration::from_millis(100)).await;
            }
            bail!("anvil did not open port {} in time", self.port)
        }
    }

    impl Drop for AnvilNode {
        fn drop(&mut self) {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }

    fn free_port() -> Result<u16> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        Ok(listener.local_addr()?.port())
    }
}
