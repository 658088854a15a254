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

//! Batch transfer workflow.
//!
//! Sends the same amount to `count` freshly generated recipients, one
//! transaction at a time. A failed transfer becomes a failed row and the loop
//! moves on; only problems detected before the first transfer abort the batch.

use alloy_primitives::{Address, U256};
use thiserror::Error;
use tracing::info;

use crate::{
    abi, query, random_address, AbiError, DeployedContract, ParameterError, QueryError,
    TokenAmount, TokenChain, TransferOutcome, TransferReport, TransferRequest, TransferStatus,
};

/// Errors that prevent a batch from starting.
#[derive(Debug, Error)]
pub enum TransferError {
    /// `decimals()` could not be read
    #[error("failed to read token decimals: {0}")]
    Decimals(#[from] QueryError),

    /// The amount cannot be expressed with the token's decimals
    #[error(transparent)]
    Amount(#[from] ParameterError),

    /// The ABI lacks a usable `transfer`
    #[error(transparent)]
    Abi(#[from] AbiError),
}

/// Progress notifications emitted by [`run_transfers`].
#[derive(Debug, Clone, Copy)]
pub enum TransferEvent<'a> {
    /// The batch is about to start
    Started {
        /// Number of transfers
        total: usize,
        /// Token decimals used for scaling
        decimals: u8,
        /// Per-transfer amount in base units
        amount: U256,
    },
    /// A transfer was handed to the chain
    Pending {
        /// Zero-based position
        index: usize,
        /// Batch size
        total: usize,
        /// Generated recipient
        recipient: Address,
    },
    /// A transfer reached its final state
    Finished(&'a TransferOutcome),
}

/// Receives [`TransferEvent`]s.
pub trait TransferObserver {
    /// Called for every event, in order.
    fn on_event(&mut self, event: TransferEvent<'_>);
}

impl TransferObserver for () {
    fn on_event(&mut self, _event: TransferEvent<'_>) {}
}

/// Send `amount` tokens to `count` random addresses, strictly one after another.
///
/// Each transfer is awaited to confirmation before the next is submitted.
/// The returned report always holds exactly `count` rows.
pub async fn run_transfers<C, O>(
    chain: &C,
    token: &DeployedContract,
    count: usize,
    amount: &TokenAmount,
    observer: &mut O,
) -> Result<TransferReport, TransferError>
where
    C: TokenChain + ?Sized,
    O: TransferObserver + ?Sized,
{
    abi::function(&token.abi, "transfer", 2)?;
    let decimals = query::decimals(chain, token).await?;
    let scaled = amount.scale(decimals)?;

    info!(count, %amount, decimals, token = %token.address, "starting transfers");
    observer.on_event(TransferEvent::Started { total: count, decimals, amount: scaled });

    let mut report = TransferReport::for_batch(count);
    for index in 0..count {
        let request = TransferRequest { recipient: random_address(), amount: scaled };
        observer.on_event(TransferEvent::Pending {
            index,
            total: count,
            recipient: request.recipient,
        });

        let status = match send_one(chain, token, &request).await {
            Ok(status) => status,
            Err(reason) => {
                info!(index, recipient = %request.recipient, "transfer failed: {reason}");
                TransferStatus::Failed(reason)
            }
        };

        let outcome = TransferOutcome { index, request, status };
        observer.on_event(TransferEvent::Finished(&outcome));
        report.outcomes.push(outcome);
    }

    info!(succeeded = report.succeeded(), failed = report.failed(), "transfers finished");
    Ok(report)
}

async fn send_one<C>(
    chain: &C,
    token: &DeployedContract,
    request: &TransferRequest,
) -> Result<TransferStatus, String>
where
    C: TokenChain + ?Sized,
{
    let input = abi::encode_transfer(&token.abi, request.recipient, request.amount)
        .map_err(|e| e.to_string())?;
    let confirmation = chain.send(token.address, input).await.map_err(|e| e.to_string())?;
    info!(recipient = %request.recipient, tx_hash = %confirmation.tx_hash, "transfer confirmed");
    Ok(TransferStatus::Success(confirmation.tx_hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{token_abi, MockChain},
        PREALLOCATED_ROWS,
    };
    use alloy_json_abi::JsonAbi;
    use std::collections::HashSet;

    #[derive(Default)]
    struct Recorder {
        started: Option<(usize, u8, U256)>,
        pending: Vec<usize>,
        finished: Vec<bool>,
    }

    impl TransferObserver for Recorder {
        fn on_event(&mut self, event: TransferEvent<'_>) {
            match event {
                TransferEvent::Started { total, decimals, amount } => {
                    self.started = Some((total, decimals, amount))
                }
                TransferEvent::Pending { index, .. } => self.pending.push(index),
                TransferEvent::Finished(outcome) => self.finished.push(outcome.is_success()),
            }
        }
    }

    fn one_token() -> U256 {
        U256::from(10).pow(U256::from(18))
    }

    #[tokio::test]
    async fn test_all_transfers_succeed() {
        let chain = MockChain::funded();
        let token = chain.install_token(U256::from(1000));
        let amount: TokenAmount = "10".parse().unwrap();
        let mut recorder = Recorder::default();

        let report = run_transfers(&chain, &token, 3, &amount, &mut recorder).await.unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.succeeded(), 3);
        assert_eq!(recorder.started, Some((3, 18, U256::from(10) * one_token())));
        assert_eq!(recorder.pending, [0, 1, 2]);

        for outcome in &report.outcomes {
            assert_eq!(chain.token_balance(outcome.request.recipient), U256::from(10) * one_token());
        }
        assert_eq!(chain.token_balance(chain.account()), U256::from(970) * one_token());
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_the_batch() {
        let chain = MockChain::funded().fail_send(3);
        let token = chain.install_token(U256::from(1000));
        let amount: TokenAmount = "1".parse().unwrap();
        let mut recorder = Recorder::default();

        let report = run_transfers(&chain, &token, 5, &amount, &mut recorder).await.unwrap();

        assert_eq!(chain.send_count(), 5);
        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(report.succeeded(), 4);
        assert_eq!(report.failed(), 1);
        assert!(matches!(report.outcomes[2].status, TransferStatus::Failed(_)));
        assert_eq!(recorder.finished, [true, true, false, true, true]);
    }

    #[tokio::test]
    async fn test_running_out_of_tokens_fails_remaining_rows() {
        let chain = MockChain::funded();
        let token = chain.install_token(U256::from(2));
        let amount: TokenAmount = "1".parse().unwrap();

        let report = run_transfers(&chain, &token, 4, &amount, &mut ()).await.unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 2);
        assert!(report.outcomes[..2].iter().all(TransferOutcome::is_success));
    }

    #[tokio::test]
    async fn test_recipients_are_fresh() {
        let chain = MockChain::funded();
        let token = chain.install_token(U256::from(1000));
        let amount: TokenAmount = "1".parse().unwrap();

        let report = run_transfers(&chain, &token, 20, &amount, &mut ()).await.unwrap();
        let recipients: HashSet<Address> =
            report.outcomes.iter().map(|o| o.request.recipient).collect();

        assert_eq!(recipients.len(), 20);
        assert!(!recipients.contains(&chain.account()));
    }

    #[tokio::test]
    async fn test_amount_scaled_by_reported_decimals() {
        let chain = MockChain::funded().with_decimals(U256::from(6));
        let token = chain.install_token(U256::from(1000));
        let amount: TokenAmount = "2.5".parse().unwrap();

        let report = run_transfers(&chain, &token, 1, &amount, &mut ()).await.unwrap();
        assert_eq!(report.outcomes[0].request.amount, U256::from(2_500_000u64));
    }

    #[tokio::test]
    async fn test_missing_transfer_function_is_fatal() {
        let chain = MockChain::funded();
        let mut token = chain.install_token(U256::from(1000));
        token.abi = JsonAbi::parse(["function decimals() view returns (uint8)"]).unwrap();
        let amount: TokenAmount = "1".parse().unwrap();

        let err = run_transfers(&chain, &token, 2, &amount, &mut ()).await.unwrap_err();
        assert!(matches!(err, TransferError::Abi(AbiError::MissingFunction { .. })));
        assert_eq!(chain.send_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_count_sends_nothing() {
        let chain = MockChain::funded();
        let token = chain.install_token(U256::from(1000));
        assert_eq!(token.abi, token_abi());
        let amount: TokenAmount = "1".parse().unwrap();

        let report = run_transfers(&chain, &token, 0, &amount, &mut ()).await.unwrap();
        assert!(report.outcomes.is_empty());
        assert_eq!(chain.send_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_larger_than_preallocation() {
        let chain = MockChain::funded().reject_all_sends();
        let token = chain.install_token(U256::from(1000));
        let amount: TokenAmount = "1".parse().unwrap();
        let count = PREALLOCATED_ROWS * 2 + 1;

        let report = run_transfers(&chain, &token, count, &amount, &mut ()).await.unwrap();

        assert_eq!(chain.send_count(), count);
        assert_eq!(report.outcomes.len(), count);
        assert_eq!(report.failed(), count);
        assert_eq!(report.outcomes[count - 1].index, count - 1);
    }

    #[derive(Clone, Default)]
    struct WarningCounter(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarningCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() <= tracing::Level::WARN {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_failed_rows_stay_below_console_level() {
        use tracing_subscriber::layer::SubscriberExt;

        let counter = WarningCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

        let report = tracing::subscriber::with_default(subscriber, || {
            let chain = MockChain::funded().fail_send(1).fail_send(2);
            let token = chain.install_token(U256::from(1000));
            let amount: TokenAmount = "1".parse().unwrap();
            runtime.block_on(run_transfers(&chain, &token, 3, &amount, &mut ())).unwrap()
        });

        assert_eq!(report.failed(), 2);
        assert_eq!(counter.0.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
