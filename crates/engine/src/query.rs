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

//! Read-only queries against a deployed token.

use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::{abi, AbiError, ChainError, DeployedContract, TokenChain};

/// Errors raised while querying token state.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The call itself failed
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The call could not be encoded or its result decoded
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// `decimals()` returned something that is not a `uint8`
    #[error("token reports {0} decimals, which does not fit in a uint8")]
    DecimalsOutOfRange(U256),
}

/// `decimals()` of the token.
pub async fn decimals<C>(chain: &C, token: &DeployedContract) -> Result<u8, QueryError>
where
    C: TokenChain + ?Sized,
{
    let value = call_uint(chain, token, "decimals", &[]).await?;
    u8::try_from(value).map_err(|_| QueryError::DecimalsOutOfRange(value))
}

/// `totalSupply()` of the token, in base units.
pub async fn total_supply<C>(chain: &C, token: &DeployedContract) -> Result<U256, QueryError>
where
    C: TokenChain + ?Sized,
{
    call_uint(chain, token, "totalSupply", &[]).await
}

/// `balanceOf(owner)`, in base units.
pub async fn balance_of<C>(
    chain: &C,
    token: &DeployedContract,
    owner: Address,
) -> Result<U256, QueryError>
where
    C: TokenChain + ?Sized,
{
    let input = abi::encode_balance_of(&token.abi, owner)?;
    let output = chain.call(token.address, input).await?;
    Ok(abi::decode_uint(&token.abi, "balanceOf", 1, &output)?)
}

async fn call_uint<C>(
    chain: &C,
    token: &DeployedContract,
    name: &str,
    args: &[alloy_dyn_abi::DynSolValue],
) -> Result<U256, QueryError>
where
    C: TokenChain + ?Sized,
{
    let input = abi::encode_call(&token.abi, name, args)?;
    let output = chain.call(token.address, input).await?;
    Ok(abi::decode_uint(&token.abi, name, args.len(), &output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockChain;

    #[tokio::test]
    async fn test_decimals_and_supply() {
        let chain = MockChain::funded();
        let token = chain.install_token(U256::from(1000));

        assert_eq!(decimals(&chain, &token).await.unwrap(), 18);
        assert_eq!(
            total_supply(&chain, &token).await.unwrap(),
            U256::from(1000) * U256::from(10).pow(U256::from(18))
        );
        assert_eq!(
            balance_of(&chain, &token, chain.account()).await.unwrap(),
            U256::from(1000) * U256::from(10).pow(U256::from(18))
        );
    }
}
