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

//! Chain access.
//!
//! [`TokenChain`] is the seam between the workflows and the network. The
//! production implementation, [`AlloyChain`], signs with a local key and talks
//! JSON-RPC through an alloy provider; tests substitute
//! [`crate::test_utils::MockChain`].

use std::{fmt, sync::Arc, time::Duration};

use alloy_network::{Ethereum, EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use async_trait::async_trait;
use thiserror::Error;
use tokenforge_common::NetworkConfig;
use tracing::{debug, info, warn};

/// Errors raised by chain access.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The RPC request failed or was rejected by the node
    #[error("RPC error: {0}")]
    Transport(#[from] TransportError),

    /// The transaction was submitted but no receipt arrived
    #[error("transaction {tx_hash} was not confirmed: {reason}")]
    Confirmation {
        /// Submitted transaction
        tx_hash: TxHash,
        /// Watcher error
        reason: String,
    },

    /// The transaction was mined with a failing status
    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// A contract-creation receipt carried no contract address
    #[error("receipt of {0} carries no contract address")]
    NoContractAddress(TxHash),
}

/// Receipt data the workflows care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    /// Confirmed transaction
    pub tx_hash: TxHash,
    /// Block the transaction landed in
    pub block_number: Option<u64>,
    /// Gas consumed
    pub gas_used: u64,
    /// Address of the created contract, for contract-creation transactions
    pub contract_address: Option<Address>,
}

/// Signed access to one chain on behalf of one account.
///
/// Every method resolves only once the node has answered; the submitting
/// methods resolve once the transaction is confirmed with a successful status.
#[async_trait]
pub trait TokenChain: Send + Sync {
    /// Account that signs every transaction.
    fn account(&self) -> Address;

    /// Native-currency balance of `account`.
    async fn balance(&self, account: Address) -> Result<U256, ChainError>;

    /// Submit a contract-creation transaction and wait for its receipt.
    async fn deploy(&self, code: Bytes, gas_limit: u64) -> Result<Confirmation, ChainError>;

    /// Execute a read-only call.
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ChainError>;

    /// Submit a transaction to `to` and wait for its receipt.
    async fn send(&self, to: Address, input: Bytes) -> Result<Confirmation, ChainError>;
}

#[async_trait]
impl<T: TokenChain + ?Sized> TokenChain for Arc<T> {
    fn account(&self) -> Address {
        (**self).account()
    }

    async fn balance(&self, account: Address) -> Result<U256, ChainError> {
        (**self).balance(account).await
    }

    async fn deploy(&self, code: Bytes, gas_limit: u64) -> Result<Confirmation, ChainError> {
        (**self).deploy(code, gas_limit).await
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ChainError> {
        (**self).call(to, input).await
    }

    async fn send(&self, to: Address, input: Bytes) -> Result<Confirmation, ChainError> {
        (**self).send(to, input).await
    }
}

/// [`TokenChain`] backed by an alloy provider with a local signer.
#[derive(Clone)]
pub struct AlloyChain {
    provider: DynProvider,
    account: Address,
    confirmation_timeout: Duration,
}

impl fmt::Debug for AlloyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlloyChain")
            .field("account", &self.account)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .finish_non_exhaustive()
    }
}

impl AlloyChain {
    /// Connect to `config.rpc_url` and bind `signer` to the provider.
    ///
    /// A chain id different from `config.chain_id` is logged but not rejected.
    pub async fn connect(
        config: &NetworkConfig,
        signer: PrivateKeySigner,
    ) -> Result<Self, ChainError> {
        let account = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(&config.rpc_url)
            .await?
            .erased();

        let chain_id = provider.get_chain_id().await?;
        if chain_id != config.chain_id {
            warn!(
                expected = config.chain_id,
                actual = chain_id,
                rpc_url = %config.rpc_url,
                "connected to an unexpected chain"
            );
        }
        info!(%account, chain_id, rpc_url = %config.rpc_url, "connected to chain");

        Ok(Self { provider, account, confirmation_timeout: config.confirmation_timeout })
    }

    async fn confirm(
        &self,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<Confirmation, ChainError> {
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, "waiting for receipt");

        let receipt = pending
            .with_timeout(Some(self.confirmation_timeout))
            .get_receipt()
            .await
            .map_err(|e| ChainError::Confirmation { tx_hash, reason: e.to_string() })?;

        if !receipt.status() {
            return Err(ChainError::Reverted(tx_hash));
        }

        Ok(Confirmation {
            tx_hash,
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            contract_address: receipt.contract_address(),
        })
    }
}

#[async_trait]
impl TokenChain for AlloyChain {
    fn account(&self) -> Address {
        self.account
    }

    async fn balance(&self, account: Address) -> Result<U256, ChainError> {
        Ok(self.provider.get_balance(account).await?)
    }

    async fn deploy(&self, code: Bytes, gas_limit: u64) -> Result<Confirmation, ChainError> {
        let tx = TransactionRequest::default()
            .with_from(self.account)
            .with_deploy_code(code)
            .with_gas_limit(gas_limit);

        let pending = self.provider.send_transaction(tx).await?;
        self.confirm(pending).await
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ChainError> {
        let tx = TransactionRequest::default().with_from(self.account).with_to(to).with_input(input);
        Ok(self.provider.call(tx).await?)
    }

    async fn send(&self, to: Address, input: Bytes) -> Result<Confirmation, ChainError> {
        let tx = TransactionRequest::default().with_from(self.account).with_to(to).with_input(input);

        let pending = self.provider.send_transaction(tx).await?;
        self.confirm(pending).await
    }
}
