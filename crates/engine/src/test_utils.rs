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

//! Test doubles for the chain and the compiler.
//!
//! [`MockChain`] keeps a tiny in-memory ERC-20 ledger so workflows can be
//! exercised end to end without a node. [`StaticCompiler`] returns a canned
//! artifact (or canned diagnostics) without invoking solc.

use std::{
    collections::{BTreeSet, HashMap},
    sync::atomic::{AtomicUsize, Ordering},
};

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{keccak256, Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    ChainError, CompileError, CompiledArtifact, Confirmation, ContractCompiler, ContractSource,
    DeployedContract, TokenChain, TOKEN_DECIMALS,
};

/// Placeholder creation bytecode handed out by [`StaticCompiler::token`].
pub const MOCK_BYTECODE: [u8; 5] = [0x60, 0x80, 0x60, 0x40, 0x52];

/// Address at which [`MockChain`] "deploys" its token.
pub const MOCK_TOKEN_ADDRESS: Address = Address::repeat_byte(0x70);

/// Interface of the embedded token, as solc emits it.
pub fn token_abi() -> JsonAbi {
    JsonAbi::parse([
        "constructor(string _name, string _symbol, uint256 _totalSupply)",
        "function name() view returns (string)",
        "function symbol() view returns (string)",
        "function decimals() view returns (uint8)",
        "function totalSupply() view returns (uint256)",
        "function balanceOf(address) view returns (uint256)",
        "function allowance(address, address) view returns (uint256)",
        "function transfer(address to, uint256 value) returns (bool)",
        "function approve(address spender, uint256 value) returns (bool)",
        "function transferFrom(address from, address to, uint256 value) returns (bool)",
        "event Transfer(address indexed from, address indexed to, uint256 value)",
        "event Approval(address indexed owner, address indexed spender, uint256 value)",
    ])
    .expect("token signatures are valid")
}

fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

#[derive(Debug, Default)]
struct Ledger {
    total_supply: U256,
    balances: HashMap<Address, U256>,
}

#[derive(Debug, Default)]
struct State {
    deploys: Vec<(Bytes, u64)>,
    sends: Vec<(Address, Bytes)>,
    ledger: Option<Ledger>,
}

/// In-memory [`TokenChain`].
///
/// Calls to `send` are numbered from 1; numbers registered with
/// [`MockChain::fail_send`] are rejected as if the node reverted them.
#[derive(Debug)]
pub struct MockChain {
    account: Address,
    native_balance: U256,
    decimals: U256,
    fail_deploy: bool,
    reject_sends: bool,
    failing_sends: BTreeSet<usize>,
    state: Mutex<State>,
}

impl MockChain {
    /// A chain where the signer holds `native_balance` wei.
    pub fn new(native_balance: U256) -> Self {
        Self {
            account: Address::repeat_byte(0x11),
            native_balance,
            decimals: U256::from(TOKEN_DECIMALS),
            fail_deploy: false,
            reject_sends: false,
            failing_sends: BTreeSet::new(),
            state: Mutex::new(State::default()),
        }
    }

    /// A chain where the signer holds one ether.
    pub fn funded() -> Self {
        Self::new(U256::from(10).pow(U256::from(18)))
    }

    /// Reject the `nth` call to `send` (1-based).
    pub fn fail_send(mut self, nth: usize) -> Self {
        self.failing_sends.insert(nth);
        self
    }

    /// Reject every call to `send`.
    pub fn reject_all_sends(mut self) -> Self {
        self.reject_sends = true;
        self
    }

    /// Revert every deployment.
    pub fn fail_deploy(mut self) -> Self {
        self.fail_deploy = true;
        self
    }

    /// Report a different `decimals()` value.
    pub fn with_decimals(mut self, decimals: U256) -> Self {
        self.decimals = decimals;
        self
    }

    /// Put a token with `supply` whole tokens, all owned by the signer, at
    /// [`MOCK_TOKEN_ADDRESS`] without going through `deploy`.
    pub fn install_token(&self, supply: U256) -> DeployedContract {
        let total_supply = supply * U256::from(10).pow(self.decimals);
        let mut state = self.state.lock();
        state.ledger = Some(Ledger {
            total_supply,
            balances: HashMap::from([(self.account, total_supply)]),
        });
        DeployedContract {
            address: MOCK_TOKEN_ADDRESS,
            abi: token_abi(),
            tx_hash: TxHash::with_last_byte(0xde),
        }
    }

    /// Number of contract-creation transactions received.
    pub fn deploy_count(&self) -> usize {
        self.state.lock().deploys.len()
    }

    /// Creation code of every deployment received.
    pub fn deployed_code(&self) -> Vec<Bytes> {
        self.state.lock().deploys.iter().map(|(code, _)| code.clone()).collect()
    }

    /// Gas ceiling attached to every deployment received.
    pub fn deployed_gas_limits(&self) -> Vec<u64> {
        self.state.lock().deploys.iter().map(|(_, gas_limit)| *gas_limit).collect()
    }

    /// Number of `send` calls received, failed ones included.
    pub fn send_count(&self) -> usize {
        self.state.lock().sends.len()
    }

    /// Token balance of `owner` in base units.
    pub fn token_balance(&self, owner: Address) -> U256 {
        self.state
            .lock()
            .ledger
            .as_ref()
            .and_then(|ledger| ledger.balances.get(&owner).copied())
            .unwrap_or_default()
    }

    fn confirmation(tx_hash: TxHash, contract_address: Option<Address>) -> Confirmation {
        Confirmation { tx_hash, block_number: Some(1), gas_used: 21_000, contract_address }
    }
}

#[async_trait]
impl TokenChain for MockChain {
    fn account(&self) -> Address {
        self.account
    }

    async fn balance(&self, account: Address) -> Result<U256, ChainError> {
        Ok(if account == self.account { self.native_balance } else { U256::ZERO })
    }

    async fn deploy(&self, code: Bytes, gas_limit: u64) -> Result<Confirmation, ChainError> {
        let mut state = self.state.lock();
        state.deploys.push((code.clone(), gas_limit));
        let tx_hash = TxHash::with_last_byte(0xd0);

        if self.fail_deploy {
            return Err(ChainError::Reverted(tx_hash));
        }

        // Creation code is the mock bytecode followed by (string, string, uint256).
        let args = code.strip_prefix(&MOCK_BYTECODE[..]).ok_or(ChainError::Reverted(tx_hash))?;
        let ctor = DynSolType::Tuple(vec![DynSolType::String, DynSolType::String, DynSolType::Uint(256)]);
        let supply = match ctor.abi_decode_params(args) {
            Ok(DynSolValue::Tuple(values)) => values.get(2).and_then(|v| v.as_uint()).map(|(v, _)| v),
            _ => None,
        }
        .ok_or(ChainError::Reverted(tx_hash))?;

        let total_supply = supply * U256::from(10).pow(self.decimals);
        state.ledger = Some(Ledger {
            total_supply,
            balances: HashMap::from([(self.account, total_supply)]),
        });

        Ok(Self::confirmation(tx_hash, Some(MOCK_TOKEN_ADDRESS)))
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ChainError> {
        let state = self.state.lock();
        let ledger = match state.ledger.as_ref() {
            Some(ledger) if to == MOCK_TOKEN_ADDRESS => ledger,
            // Calls to an address without code return nothing.
            _ => return Ok(Bytes::new()),
        };

        let value = match input.get(..4) {
            Some(sel) if sel == selector("decimals()") => self.decimals,
            Some(sel) if sel == selector("totalSupply()") => ledger.total_supply,
            Some(sel) if sel == selector("balanceOf(address)") && input.len() >= 36 => {
                let owner = Address::from_slice(&input[16..36]);
                ledger.balances.get(&owner).copied().unwrap_or_default()
            }
            _ => return Ok(Bytes::new()),
        };
        Ok(DynSolValue::Uint(value, 256).abi_encode().into())
    }

    async fn send(&self, to: Address, input: Bytes) -> Result<Confirmation, ChainError> {
        let mut state = self.state.lock();
        state.sends.push((to, input.clone()));
        let nth = state.sends.len();
        let tx_hash = TxHash::from(U256::from(nth));

        if self.reject_sends || self.failing_sends.contains(&nth) {
            return Err(ChainError::Reverted(tx_hash));
        }

        let ledger = state
            .ledger
            .as_mut()
            .filter(|_| to == MOCK_TOKEN_ADDRESS)
            .ok_or(ChainError::Reverted(tx_hash))?;

        if input.get(..4) != Some(&selector("transfer(address,uint256)")[..]) || input.len() < 68 {
            return Err(ChainError::Reverted(tx_hash));
        }
        let recipient = Address::from_slice(&input[16..36]);
        let amount = U256::from_be_slice(&input[36..68]);

        let sender_balance = ledger.balances.entry(self.account).or_default();
        if *sender_balance < amount {
            return Err(ChainError::Reverted(tx_hash));
        }
        *sender_balance -= amount;
        *ledger.balances.entry(recipient).or_default() += amount;

        Ok(Self::confirmation(tx_hash, None))
    }
}

/// [`ContractCompiler`] returning a fixed result.
#[derive(Debug)]
pub struct StaticCompiler {
    result: Result<CompiledArtifact, Vec<String>>,
    calls: AtomicUsize,
}

impl StaticCompiler {
    /// Returns the token ABI with [`MOCK_BYTECODE`].
    pub fn token() -> Self {
        Self {
            result: Ok(CompiledArtifact {
                abi: token_abi(),
                bytecode: Bytes::copy_from_slice(&MOCK_BYTECODE),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails with the given diagnostics.
    pub fn failing(errors: Vec<String>) -> Self {
        Self { result: Err(errors), calls: AtomicUsize::new(0) }
    }

    /// Number of compilations requested.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContractCompiler for StaticCompiler {
    fn compile(&self, _source: &ContractSource) -> Result<CompiledArtifact, CompileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(CompileError::Compilation)
    }
}
