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

//! Data model shared by the deployment and transfer workflows.

use std::{fmt, str::FromStr};

use alloy_json_abi::JsonAbi;
use alloy_primitives::{utils::parse_units, Address, TxHash, U256};
use thiserror::Error;

use crate::TOKEN_DECIMALS;

/// Errors raised while validating user-supplied values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// A text field was empty
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// A numeric field was not a positive whole number
    #[error("{field} must be a positive integer, got `{input}`")]
    NotPositiveInteger {
        /// Field name
        field: &'static str,
        /// What the user typed
        input: String,
    },

    /// The supply does not fit once scaled by the token's decimals
    #[error("total supply {0} overflows once scaled by the token decimals")]
    SupplyTooLarge(U256),

    /// A token amount was not a positive decimal number
    #[error("amount must be a positive number, got `{input}`: {reason}")]
    InvalidAmount {
        /// What the user typed
        input: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Parse a strictly positive base-10 integer.
pub fn parse_positive_integer(field: &'static str, input: &str) -> Result<U256, ParameterError> {
    let trimmed = input.trim();
    let invalid = || ParameterError::NotPositiveInteger { field, input: input.to_string() };

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value = U256::from_str_radix(trimmed, 10).map_err(|_| invalid())?;
    if value.is_zero() {
        return Err(invalid());
    }
    Ok(value)
}

/// Parse a strictly positive count that fits in `usize`.
pub fn parse_count(field: &'static str, input: &str) -> Result<usize, ParameterError> {
    let value = parse_positive_integer(field, input)?;
    usize::try_from(value)
        .map_err(|_| ParameterError::NotPositiveInteger { field, input: input.to_string() })
}

/// Constructor arguments of the token, captured once from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParameters {
    name: String,
    symbol: String,
    total_supply: U256,
}

impl TokenParameters {
    /// Validate and capture the constructor arguments.
    ///
    /// `total_supply` is in whole tokens; the contract scales it by `10^18`.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        total_supply: U256,
    ) -> Result<Self, ParameterError> {
        let name = name.into().trim().to_string();
        let symbol = symbol.into().trim().to_string();

        if name.is_empty() {
            return Err(ParameterError::Empty("token name"));
        }
        if symbol.is_empty() {
            return Err(ParameterError::Empty("token symbol"));
        }
        if total_supply.is_zero() {
            return Err(ParameterError::NotPositiveInteger {
                field: "total supply",
                input: total_supply.to_string(),
            });
        }
        if total_supply > U256::MAX / U256::from(10).pow(U256::from(TOKEN_DECIMALS)) {
            return Err(ParameterError::SupplyTooLarge(total_supply));
        }

        Ok(Self { name, symbol, total_supply })
    }

    /// Token name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Supply in whole tokens
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }
}

/// A token amount typed by the user, validated but not yet scaled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount(String);

impl TokenAmount {
    /// Scale by `10^decimals` into base units.
    pub fn scale(&self, decimals: u8) -> Result<U256, ParameterError> {
        let invalid =
            |reason: String| ParameterError::InvalidAmount { input: self.0.clone(), reason };

        let parsed = parse_units(&self.0, decimals).map_err(|e| invalid(e.to_string()))?;
        if parsed.is_negative() {
            return Err(invalid("negative amounts are not allowed".to_string()));
        }
        let value = parsed.get_absolute();
        if value.is_zero() {
            return Err(invalid(format!("rounds to zero with {decimals} decimals")));
        }
        Ok(value)
    }
}

impl FromStr for TokenAmount {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Self(s.trim().to_string());
        amount.scale(TOKEN_DECIMALS)?;
        Ok(amount)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A token contract living on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    /// Contract address
    pub address: Address,
    /// Interface used to encode calls
    pub abi: JsonAbi,
    /// Hash of the creation transaction
    pub tx_hash: TxHash,
}

/// One transfer of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    /// Freshly generated recipient
    pub recipient: Address,
    /// Amount in base units
    pub amount: U256,
}

/// Final state of a transfer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    /// Confirmed on chain
    Success(TxHash),
    /// Rejected, reverted or timed out
    Failed(String),
}

/// Result of one iteration of the transfer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Zero-based position in the batch
    pub index: usize,
    /// What was attempted
    pub request: TransferRequest,
    /// How it ended
    pub status: TransferStatus,
}

impl TransferOutcome {
    /// Whether the transfer was confirmed.
    pub fn is_success(&self) -> bool {
        matches!(self.status, TransferStatus::Success(_))
    }
}

/// All rows of a transfer batch, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Rows in submission order
    pub outcomes: Vec<TransferOutcome>,
}

/// Rows reserved up front for a batch; larger batches grow as they run.
pub const PREALLOCATED_ROWS: usize = 1024;

impl TransferReport {
    /// Empty report for a batch of `count` transfers.
    pub fn for_batch(count: usize) -> Self {
        Self { outcomes: Vec::with_capacity(count.min(PREALLOCATED_ROWS)) }
    }

    /// Number of confirmed transfers.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed transfers.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}
