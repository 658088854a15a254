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

//! Token deployment workflow.
//!
//! One call to [`TokenDeployer::deploy`] creates exactly one contract. The
//! steps run in a fixed order and any failure aborts the whole workflow:
//!
//! 1. check that the signer can pay for gas,
//! 2. compile the embedded source,
//! 3. encode the constructor arguments and submit the creation transaction,
//! 4. wait for the receipt and return the contract address.

use alloy_primitives::{Address, TxHash, U256};
use thiserror::Error;
use tokenforge_common::{load_signer, ConfigError, NetworkConfig, DEFAULT_DEPLOY_GAS_LIMIT};
use tracing::{debug, info};

use crate::{
    abi, AbiError, AlloyChain, ChainError, CompileError, ContractCompiler, ContractSource,
    DeployedContract, TokenChain, TokenParameters,
};

/// Errors that abort a deployment.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The signing credential is missing or malformed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The signer holds no native currency
    #[error("account {account} has no funds to pay for deployment")]
    InsufficientFunds {
        /// Signing account
        account: Address,
    },

    /// The contract did not compile
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Constructor arguments could not be encoded
    #[error("failed to encode constructor arguments: {0}")]
    Encoding(#[from] AbiError),

    /// Submission was rejected, reverted or never confirmed
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Progress notifications emitted by [`TokenDeployer::deploy`].
#[derive(Debug, Clone, Copy)]
pub enum DeployEvent<'a> {
    /// The signer's balance was read and is positive
    FundsChecked {
        /// Signing account
        account: Address,
        /// Balance in wei
        balance: U256,
    },
    /// Compilation is about to start
    Compiling {
        /// Contract being compiled
        contract: &'a str,
    },
    /// Compilation finished
    Compiled {
        /// Creation bytecode size, without constructor arguments
        bytecode_len: usize,
    },
    /// The creation transaction is about to be submitted
    Submitting {
        /// Gas ceiling
        gas_limit: u64,
    },
    /// The creation transaction was confirmed
    Deployed {
        /// Contract address
        address: Address,
        /// Creation transaction
        tx_hash: TxHash,
        /// Gas consumed
        gas_used: u64,
    },
}

/// Receives [`DeployEvent`]s.
pub trait DeployObserver {
    /// Called once per step.
    fn on_event(&mut self, event: DeployEvent<'_>);
}

impl DeployObserver for () {
    fn on_event(&mut self, _event: DeployEvent<'_>) {}
}

/// Acquire the signer from the environment and bind it to `config.rpc_url`.
///
/// This is the first step of every workflow run.
pub async fn connect(config: &NetworkConfig) -> Result<AlloyChain, DeployError> {
    let signer = load_signer()?;
    Ok(AlloyChain::connect(config, signer).await?)
}

/// Compiles and deploys a [`ContractSource`].
#[derive(Debug)]
pub struct TokenDeployer<K> {
    compiler: K,
    source: ContractSource,
    gas_limit: u64,
}

impl<K: ContractCompiler> TokenDeployer<K> {
    /// Deployer for the embedded token.
    pub fn new(compiler: K) -> Self {
        Self { compiler, source: ContractSource::token(), gas_limit: DEFAULT_DEPLOY_GAS_LIMIT }
    }

    /// Deploy a different source.
    pub fn with_source(mut self, source: ContractSource) -> Self {
        self.source = source;
        self
    }

    /// Attach a different gas ceiling to the creation transaction.
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// The compiler in use.
    pub fn compiler(&self) -> &K {
        &self.compiler
    }

    /// Deploy one token instance with `params` as constructor arguments.
    pub async fn deploy<C, O>(
        &self,
        chain: &C,
        params: &TokenParameters,
        observer: &mut O,
    ) -> Result<DeployedContract, DeployError>
    where
        C: TokenChain + ?Sized,
        O: DeployObserver + ?Sized,
    {
        let account = chain.account();
        let balance = chain.balance(account).await?;
        if balance.is_zero() {
            return Err(DeployError::InsufficientFunds { account });
        }
        debug!(%account, %balance, "deployer is funded");
        observer.on_event(DeployEvent::FundsChecked { account, balance });

        observer.on_event(DeployEvent::Compiling { contract: self.source.contract_name() });
        let artifact = self.compiler.compile(&self.source)?;
        observer.on_event(DeployEvent::Compiled { bytecode_len: artifact.bytecode.len() });

        let code = abi::deploy_code(&artifact, params)?;
        observer.on_event(DeployEvent::Submitting { gas_limit: self.gas_limit });
        info!(
            name = params.name(),
            symbol = params.symbol(),
            supply = %params.total_supply(),
            gas_limit = self.gas_limit,
            "submitting contract creation"
        );

        let confirmation = chain.deploy(code, self.gas_limit).await?;
        let address = confirmation
            .contract_address
            .ok_or(ChainError::NoContractAddress(confirmation.tx_hash))?;

        info!(%address, tx_hash = %confirmation.tx_hash, gas_used = confirmation.gas_used, "token deployed");
        observer.on_event(DeployEvent::Deployed {
            address,
            tx_hash: confirmation.tx_hash,
            gas_used: confirmation.gas_used,
        });

        Ok(DeployedContract { address, abi: artifact.abi, tx_hash: confirmation.tx_hash })
    }
}
