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

//! TokenForge
//!
//! Deploy an ERC-20 token to a test network and exercise it with transfers to
//! freshly generated addresses.

use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use eyre::Result;
use tokenforge_common::{
    env::{TOKENFORGE_CHAIN_ID, TOKENFORGE_RPC_URL},
    logging, NetworkConfig, DEFAULT_CHAIN_ID, DEFAULT_DEPLOY_GAS_LIMIT, DEFAULT_RPC_URL,
};
use tokenforge_engine::{SolcCompiler, TokenDeployer};
use tracing::Level;

mod display;
mod shell;

use display::Console;
use shell::{Presets, Shell, TerminalPrompter};

/// Command-line interface for TokenForge
#[derive(Debug, Parser)]
#[command(name = "tokenforge")]
#[command(about = "TokenForge - Deploy an ERC-20 token and send test transfers to random addresses")]
#[command(version)]
pub struct Cli {
    /// JSON-RPC endpoint
    #[arg(long, env = TOKENFORGE_RPC_URL, default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Chain id the endpoint is expected to report
    #[arg(long, env = TOKENFORGE_CHAIN_ID, default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: u64,

    /// Gas ceiling for the deployment transaction
    #[arg(long, default_value_t = DEFAULT_DEPLOY_GAS_LIMIT)]
    pub gas_limit: u64,

    /// Seconds to wait for each transaction receipt
    #[arg(long, default_value = "120")]
    pub confirmation_timeout: u64,

    /// Directory the contract source is written to before compilation
    #[arg(long, default_value = ".")]
    pub artifact_dir: PathBuf,

    /// Token name (prompted when absent)
    #[arg(long)]
    pub name: Option<String>,

    /// Token symbol (prompted when absent)
    #[arg(long)]
    pub symbol: Option<String>,

    /// Total supply in whole tokens (prompted when absent)
    #[arg(long)]
    pub supply: Option<String>,

    /// Number of test transfers; implies that transfers are wanted
    #[arg(long, conflicts_with = "skip_transfers")]
    pub transfers: Option<String>,

    /// Tokens per transfer (prompted when absent)
    #[arg(long)]
    pub amount: Option<String>,

    /// Deploy only, do not offer test transfers
    #[arg(long)]
    pub skip_transfers: bool,

    /// Show workflow logs on the console
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not write a log file
    #[arg(long)]
    pub no_log_file: bool,

    /// Show a plain progress line instead of animated spinners
    #[arg(long)]
    pub no_spinner: bool,
}

impl Cli {
    fn network(&self) -> NetworkConfig {
        let mut config = NetworkConfig::default()
            .with_rpc_url(self.rpc_url.clone())
            .with_chain_id(self.chain_id)
            .with_confirmation_timeout(Duration::from_secs(self.confirmation_timeout));
        config.deploy_gas_limit = self.gas_limit;
        config
    }

    fn presets(&self) -> Presets {
        Presets {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            supply: self.supply.clone(),
            transfers: self.transfers.clone(),
            amount: self.amount.clone(),
            skip_transfers: self.skip_transfers,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    let console_level = if cli.verbose { Level::INFO } else { Level::WARN };
    logging::init_logging("tokenforge", console_level, !cli.no_log_file)?;

    let config = cli.network();
    tracing::info!(rpc_url = %config.rpc_url, chain_id = config.chain_id, "starting tokenforge");

    let console = Console::new(!cli.no_spinner);
    console.banner();
    console.field("Network", &config.rpc_url);

    let deployer = TokenDeployer::new(SolcCompiler::new(cli.artifact_dir.clone()))
        .with_gas_limit(config.deploy_gas_limit);
    let mut shell = Shell::new(TerminalPrompter::default(), deployer, cli.presets(), console);

    match shell.run(|| tokenforge_engine::connect(&config)).await {
        Ok(session) => {
            let transfers = session.report.as_ref().map(|report| report.outcomes.len());
            tracing::info!(token = %session.token.address, ?transfers, "session complete");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::debug!(error = ?err, "session aborted");
            shell.console_mut().failure(&err.to_string());
            Ok(ExitCode::FAILURE)
        }
    }
}
