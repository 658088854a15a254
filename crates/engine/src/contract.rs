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

//! The embedded token contract.
//!
//! The contract text ships inside the binary. Before compilation it is written
//! next to the user's working directory so the compiler reads it from disk,
//! and the file is left in place afterwards.

use std::{
    borrow::Cow,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

/// Solidity source of the fixed ERC-20 token.
///
/// Decimals are fixed at 18 and the constructor mints
/// `totalSupply * 10**decimals` to the deployer.
pub const TOKEN_SOURCE: &str = include_str!("../contracts/Token.sol");

/// Name of the contract defined in [`TOKEN_SOURCE`].
pub const TOKEN_CONTRACT_NAME: &str = "Token";

/// File the source is written to before compilation.
pub const TOKEN_FILE_NAME: &str = "Token.sol";

/// Decimal precision declared by the embedded token.
pub const TOKEN_DECIMALS: u8 = 18;

/// A Solidity source file together with the contract to extract from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSource {
    file_name: Cow<'static, str>,
    contract_name: Cow<'static, str>,
    code: Cow<'static, str>,
}

impl ContractSource {
    /// The embedded token contract.
    pub const fn token() -> Self {
        Self {
            file_name: Cow::Borrowed(TOKEN_FILE_NAME),
            contract_name: Cow::Borrowed(TOKEN_CONTRACT_NAME),
            code: Cow::Borrowed(TOKEN_SOURCE),
        }
    }

    /// An arbitrary source, mostly useful for tests.
    pub fn new(
        file_name: impl Into<String>,
        contract_name: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            file_name: Cow::Owned(file_name.into()),
            contract_name: Cow::Owned(contract_name.into()),
            code: Cow::Owned(code.into()),
        }
    }

    /// File name used for the on-disk copy and as the compiler's source key.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Contract whose artifact is extracted after compilation.
    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    /// Source text.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Write the source into `dir`, creating the directory if needed.
    ///
    /// An existing file with the same name is overwritten.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        fs::write(&path, self.code())?;
        debug!(path = %path.display(), bytes = self.code.len(), "wrote contract source");
        Ok(path)
    }
}

impl Default for ContractSource {
    fn default() -> Self {
        Self::token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_source_defines_token() {
        let source = ContractSource::token();
        assert!(source.code().contains("contract Token"));
        assert!(source.code().contains("uint8 public constant decimals = 18"));
        assert!(source.code().contains("function transferFrom"));
        assert_eq!(source.contract_name(), TOKEN_CONTRACT_NAME);
    }

    #[test]
    fn test_write_to_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("build");
        let path = ContractSource::token().write_to(&nested).unwrap();

        assert_eq!(path, nested.join(TOKEN_FILE_NAME));
        assert_eq!(fs::read_to_string(&path).unwrap(), TOKEN_SOURCE);
    }

    #[test]
    fn test_write_to_overwrites_stale_copy() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Broken.sol"), "stale").unwrap();

        let source = ContractSource::new("Broken.sol", "Broken", "contract Broken {}");
        let path = source.write_to(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "contract Broken {}");
    }
}
