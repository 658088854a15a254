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

//! Solidity compilation.
//!
//! [`SolcCompiler`] writes a [`ContractSource`] to disk, compiles it with a
//! pinned solc release (installed through svm on first use) and extracts the
//! ABI and creation bytecode of the requested contract.

use std::path::PathBuf;

use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use foundry_compilers::{
    artifacts::{
        output_selection::OutputSelection, CompilerOutput, EvmVersion, Settings, SolcInput, Source,
        Sources,
    },
    error::{SolcError, SolcIoError},
    solc::{Solc, SolcLanguage},
};
use semver::Version;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::ContractSource;

/// Solc release used for the embedded token.
pub const DEFAULT_SOLC_VERSION: Version = Version::new(0, 8, 19);

/// Optimizer runs passed to solc.
pub const DEFAULT_OPTIMIZER_RUNS: usize = 200;

/// ABI and creation bytecode of a compiled contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    /// Contract interface
    pub abi: JsonAbi,
    /// Creation bytecode, without constructor arguments
    pub bytecode: Bytes,
}

/// Errors that can occur while compiling a contract.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Solc reported at least one diagnostic of severity "error"
    #[error("compilation failed:\n{}", .0.join("\n"))]
    Compilation(Vec<String>),

    /// The requested contract is not part of the compiler output
    #[error("contract `{0}` not found in compiler output")]
    ContractNotFound(String),

    /// The contract was found but its ABI or bytecode is missing or unlinked
    #[error("compiler output for `{contract}` is missing {what}")]
    MissingOutput {
        /// Contract name
        contract: String,
        /// Which output is missing
        what: &'static str,
    },

    /// Solc could not be installed or invoked
    #[error(transparent)]
    Solc(#[from] SolcError),

    /// The source file could not be read back
    #[error(transparent)]
    SourceIo(#[from] SolcIoError),

    /// The source file could not be written
    #[error("failed to write contract source: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything able to turn a [`ContractSource`] into a [`CompiledArtifact`].
pub trait ContractCompiler {
    /// Compile `source` and extract the artifact of its named contract.
    fn compile(&self, source: &ContractSource) -> Result<CompiledArtifact, CompileError>;
}

/// Compiler backed by a local solc binary.
#[derive(Debug, Clone)]
pub struct SolcCompiler {
    version: Version,
    optimizer_runs: usize,
    evm_version: EvmVersion,
    artifact_dir: PathBuf,
}

impl SolcCompiler {
    /// New compiler writing sources into `artifact_dir`.
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            version: DEFAULT_SOLC_VERSION,
            optimizer_runs: DEFAULT_OPTIMIZER_RUNS,
            // Paris avoids PUSH0, which not every test network supports.
            evm_version: EvmVersion::Paris,
            artifact_dir: artifact_dir.into(),
        }
    }

    /// Directory the source is written to.
    pub fn artifact_dir(&self) -> &PathBuf {
        &self.artifact_dir
    }

    /// Build the standard-json input for `source`, reading it back from `path`.
    fn input(&self, source: &ContractSource, path: &PathBuf) -> Result<SolcInput, CompileError> {
        let sources =
            Sources::from_iter([(PathBuf::from(source.file_name()), Source::read(path)?)]);

        let mut settings = Settings::default();
        settings.optimizer.enable();
        settings.optimizer.runs(self.optimizer_runs);
        settings.evm_version = Some(self.evm_version);
        settings.output_selection = OutputSelection::common_output_selection([
            "abi".to_string(),
            "evm.bytecode".to_string(),
        ]);
        trace!(settings = ?settings, "using settings");

        Ok(SolcInput::new(SolcLanguage::Solidity, sources, settings))
    }
}

impl ContractCompiler for SolcCompiler {
    fn compile(&self, source: &ContractSource) -> Result<CompiledArtifact, CompileError> {
        let path = source.write_to(&self.artifact_dir)?;
        let input = self.input(source, &path)?;

        let solc = Solc::find_or_install(&self.version)?;
        debug!(solc = ?solc, path = %path.display(), "compiling contract source");

        let output = solc.compile_exact(&input)?;
        let artifact = extract_artifact(&output, source.contract_name())?;

        info!(
            contract = source.contract_name(),
            bytecode_len = artifact.bytecode.len(),
            "compiled contract"
        );
        Ok(artifact)
    }
}

/// Pull the artifact of `contract_name` out of a solc output.
///
/// Error diagnostics fail the whole compilation; warnings are only logged.
pub fn extract_artifact(
    output: &CompilerOutput,
    contract_name: &str,
) -> Result<CompiledArtifact, CompileError> {
    let mut errors = Vec::new();
    for diagnostic in &output.errors {
        let message = diagnostic
            .formatted_message
            .clone()
            .unwrap_or_else(|| diagnostic.message.clone());
        if diagnostic.is_error() {
            errors.push(message);
        } else if diagnostic.severity.is_warning() {
            warn!(contract = contract_name, "solc warning: {}", message.trim_end());
        }
    }
    if !errors.is_empty() {
        return Err(CompileError::Compilation(errors));
    }

    let contract = output
        .contracts
        .values()
        .find_map(|contracts| contracts.get(contract_name))
        .ok_or_else(|| CompileError::ContractNotFound(contract_name.to_string()))?;

    let missing = |what| CompileError::MissingOutput { contract: contract_name.to_string(), what };

    let abi = contract.abi.clone().ok_or_else(|| missing("the ABI"))?;
    let bytecode = contract
        .evm
        .as_ref()
        .and_then(|evm| evm.bytecode.as_ref())
        .and_then(|bytecode| bytecode.object.as_bytes())
        .cloned()
        .ok_or_else(|| missing("linked creation bytecode"))?;

    if bytecode.is_empty() {
        return Err(missing("creation bytecode (is the contract abstract?)"));
    }

    Ok(CompiledArtifact { abi, bytecode })
}
