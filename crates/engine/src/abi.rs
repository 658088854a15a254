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

//! ABI encoding against the compiled token interface.
//!
//! Calls are encoded from the artifact's [`JsonAbi`] at runtime instead of
//! generated bindings, so the workflow only depends on what solc produced.

use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{Address, Bytes, U256};
use thiserror::Error;

use crate::{CompiledArtifact, TokenParameters};

/// Errors that can occur while encoding calls or decoding return data.
#[derive(Debug, Error)]
pub enum AbiError {
    /// The ABI has no function with this name and arity
    #[error("ABI has no function `{name}` taking {arity} argument(s)")]
    MissingFunction {
        /// Function name
        name: String,
        /// Expected number of inputs
        arity: usize,
    },

    /// The ABI declares no constructor
    #[error("ABI has no constructor")]
    MissingConstructor,

    /// The return data did not decode into a single unsigned integer
    #[error("`{0}` did not return a single unsigned integer")]
    UnexpectedOutput(String),

    /// Encoding or decoding failed
    #[error(transparent)]
    DynAbi(#[from] alloy_dyn_abi::Error),
}

/// Find the overload of `name` taking `arity` inputs.
pub fn function<'a>(abi: &'a JsonAbi, name: &str, arity: usize) -> Result<&'a Function, AbiError> {
    abi.function(name)
        .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
        .ok_or_else(|| AbiError::MissingFunction { name: name.to_string(), arity })
}

/// Creation bytecode followed by the ABI-encoded constructor arguments.
pub fn deploy_code(
    artifact: &CompiledArtifact,
    params: &TokenParameters,
) -> Result<Bytes, AbiError> {
    let constructor = artifact.abi.constructor().ok_or(AbiError::MissingConstructor)?;
    let args = constructor.abi_encode_input(&[
        DynSolValue::String(params.name().to_string()),
        DynSolValue::String(params.symbol().to_string()),
        DynSolValue::Uint(params.total_supply(), 256),
    ])?;

    let mut code = artifact.bytecode.to_vec();
    code.extend_from_slice(&args);
    Ok(code.into())
}

/// Calldata for `transfer(to, amount)`.
pub fn encode_transfer(abi: &JsonAbi, to: Address, amount: U256) -> Result<Bytes, AbiError> {
    encode_call(abi, "transfer", &[DynSolValue::Address(to), DynSolValue::Uint(amount, 256)])
}

/// Calldata for `balanceOf(owner)`.
pub fn encode_balance_of(abi: &JsonAbi, owner: Address) -> Result<Bytes, AbiError> {
    encode_call(abi, "balanceOf", &[DynSolValue::Address(owner)])
}

/// Calldata for any function of the interface.
pub fn encode_call(abi: &JsonAbi, name: &str, args: &[DynSolValue]) -> Result<Bytes, AbiError> {
    let function = function(abi, name, args.len())?;
    Ok(function.abi_encode_input(args)?.into())
}

/// Decode the return data of a function returning one unsigned integer.
pub fn decode_uint(abi: &JsonAbi, name: &str, arity: usize, data: &[u8]) -> Result<U256, AbiError> {
    let function = function(abi, name, arity)?;
    match function.abi_decode_output(data)?.as_slice() {
        [value] => value
            .as_uint()
            .map(|(value, _)| value)
            .ok_or_else(|| AbiError::UnexpectedOutput(name.to_string())),
        _ => Err(AbiError::UnexpectedOutput(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::token_abi;
    use alloy_primitives::hex;

    #[test]
    fn test_encode_transfer_uses_standard_selector() {
        let to: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        let data = encode_transfer(&token_abi(), to, U256::from(1)).unwrap();

        assert_eq!(data.len(), 4 + 32 * 2);
        assert_eq!(&data[..4], hex!("a9059cbb"));
        assert_eq!(data[4 + 31], 0xaa);
        assert_eq!(data[4 + 32 + 31], 1);
    }

    #[test]
    fn test_deploy_code_appends_constructor_args() {
        let artifact = CompiledArtifact {
            abi: token_abi(),
            bytecode: Bytes::copy_from_slice(&hex!("6080604052")),
        };
        let params = TokenParameters::new("Seismic", "SEI", U256::from(1000)).unwrap();
        let code = deploy_code(&artifact, &params).unwrap();

        assert!(code.starts_with(&hex!("6080604052")));
        let args = &code[5..];
        // Two dynamic offsets, the raw supply, then both string tails.
        assert_eq!(U256::from_be_slice(&args[64..96]), U256::from(1000));
        assert!(args.windows(7).any(|w| w == b"Seismic"));
        assert!(args.windows(3).any(|w| w == b"SEI"));
    }

    #[test]
    fn test_deploy_code_requires_constructor() {
        let artifact = CompiledArtifact {
            abi: JsonAbi::parse(["function decimals() view returns (uint8)"]).unwrap(),
            bytecode: Bytes::copy_from_slice(&hex!("00")),
        };
        let params = TokenParameters::new("Seismic", "SEI", U256::from(1)).unwrap();
        assert!(matches!(deploy_code(&artifact, &params), Err(AbiError::MissingConstructor)));
    }

    #[test]
    fn test_decode_uint() {
        let abi = token_abi();
        let data = DynSolValue::Uint(U256::from(18), 8).abi_encode();
        assert_eq!(decode_uint(&abi, "decimals", 0, &data).unwrap(), U256::from(18));

        assert!(matches!(
            decode_uint(&abi, "mint", 0, &data),
            Err(AbiError::MissingFunction { .. })
        ));
    }
}
