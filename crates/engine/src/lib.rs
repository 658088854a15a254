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

//! TokenForge Engine - compile, deploy and exercise the embedded ERC-20 token.
//!
//! # Workflow
//!
//! 1. [`connect`] loads the signer from the environment and binds it to the
//!    configured RPC endpoint.
//! 2. [`TokenDeployer::deploy`] checks funds, compiles [`ContractSource::token`]
//!    through a [`ContractCompiler`] and submits the creation transaction.
//! 3. [`run_transfers`] sends a fixed amount to freshly generated addresses,
//!    reporting every row and carrying on past individual failures.
//!
//! All chain access goes through the [`TokenChain`] trait; [`test_utils`]
//! provides an in-memory implementation.

pub mod abi;
pub use abi::AbiError;

mod address;
pub use address::*;

mod chain;
pub use chain::*;

mod compiler;
pub use compiler::*;

mod contract;
pub use contract::*;

mod deploy;
pub use deploy::*;

pub mod query;
pub use query::QueryError;

pub mod test_utils;

mod transfer;
pub use transfer::*;

mod types;
pub use types::*;
