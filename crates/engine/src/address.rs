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

//! Random recipient addresses.

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;

/// Generate a fresh, unpredictable account address.
///
/// A secp256k1 key is drawn from the operating system's CSPRNG, its address
/// derived, and the key dropped. Nobody holds the key afterwards, so tokens sent
/// here are unrecoverable.
pub fn random_address() -> Address {
    PrivateKeySigner::random().address()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_address_is_well_formed() {
        let address = random_address();
        let checksummed = address.to_checksum(None);

        assert_eq!(checksummed.len(), 42);
        assert!(checksummed.starts_with("0x"));
        assert_eq!(checksummed.parse::<Address>().unwrap(), address);
        assert_ne!(address, Address::ZERO);
    }

    #[test]
    fn test_random_addresses_are_distinct() {
        let addresses: HashSet<Address> = (0..1000).map(|_| random_address()).collect();
        assert_eq!(addresses.len(), 1000);
    }
}
