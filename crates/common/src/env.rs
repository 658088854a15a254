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

//! Environment variable name constants for TokenForge configuration.
//!
//! # Environment Variables
//!
//! ## Credentials
//! - [`PRIVATE_KEY`] - Hex-encoded key used to sign every transaction
//!
//! ## Network
//! - [`TOKENFORGE_RPC_URL`] - Overrides the default JSON-RPC endpoint
//! - [`TOKENFORGE_CHAIN_ID`] - Overrides the expected chain id
//!
//! ## Testing Configuration
//! - [`TOKENFORGE_TEST_ANVIL_PATH`] - Location of the `anvil` binary used by end-to-end tests

/// Environment variable holding the deployer's private key.
///
/// The value is a 32-byte secp256k1 secret encoded as hex, with or without the
/// `0x` prefix. It is read once at the start of each workflow. A `.env` file in
/// the working directory is loaded before the variable is looked up.
///
/// # Examples
///
/// ```bash
/// PRIVATE_KEY=0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80 tokenforge
/// ```
pub const PRIVATE_KEY: &str = "PRIVATE_KEY";

/// Environment variable overriding the JSON-RPC endpoint.
///
/// # Default
///
/// When not set, the Seismic devnet endpoint
/// ([`crate::DEFAULT_RPC_URL`]) is used.
///
/// # Related
///
/// This is also available as a CLI argument (`--rpc-url`).
pub const TOKENFORGE_RPC_URL: &str = "TOKENFORGE_RPC_URL";

/// Environment variable overriding the chain id the endpoint is expected to report.
pub const TOKENFORGE_CHAIN_ID: &str = "TOKENFORGE_CHAIN_ID";

/// Environment variable pointing end-to-end tests at a specific `anvil` binary.
///
/// This variable is intended for testing only. When unset the binary is looked
/// up on `PATH`.
pub const TOKENFORGE_TEST_ANVIL_PATH: &str = "TOKENFORGE_TEST_ANVIL_PATH";
