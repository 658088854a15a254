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

//! The interactive session: collect token parameters, deploy, then optionally
//! run a batch of transfers.
//!
//! Every step is awaited in order. Errors abort the session except for
//! individual transfer failures, which [`run_transfers`] records as rows.

use std::future::Future;

use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use thiserror::Error;
use tokenforge_engine::{
    parse_count, parse_positive_integer, run_transfers, ContractCompiler, DeployError,
    DeployedContract, ParameterError, TokenAmount, TokenChain, TokenDeployer, TokenParameters,
    TransferError, TransferReport,
};
use tracing::{debug, info};

use crate::display::Console;

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum ShellError {
    /// An answer failed validation
    #[error("invalid input: {0}")]
    Validation(#[from] ParameterError),

    /// The terminal could not be read
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// The scripted prompter ran out of answers
    #[cfg(test)]
    #[error("no answer available for '{0}'")]
    NoAnswer(String),

    /// The deployment workflow failed
    #[error("deployment failed: {0}")]
    Deploy(#[from] DeployError),

    /// The transfer workflow could not start
    #[error("transfers aborted: {0}")]
    Transfer(#[from] TransferError),
}

/// Source of answers for the session.
pub trait Prompter {
    /// Ask for a line of text.
    fn text(&mut self, prompt: &str) -> Result<String, ShellError>;

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ShellError>;
}

/// Prompts on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Prompter for TerminalPrompter {
    fn text(&mut self, prompt: &str) -> Result<String, ShellError> {
        Ok(Input::<String>::with_theme(&self.theme).with_prompt(prompt).interact_text()?)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ShellError> {
        Ok(Confirm::with_theme(&self.theme).with_prompt(prompt).default(default).interact()?)
    }
}

/// Replays a fixed list of answers; `confirm` accepts `y`/`yes`/`n`/`no`.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    asked: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { answers: answers.into_iter().map(Into::into).collect(), asked: Vec::new() }
    }

    /// Prompts shown so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    fn next(&mut self, prompt: &str) -> Result<String, ShellError> {
        self.asked.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| ShellError::NoAnswer(prompt.to_string()))
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn text(&mut self, prompt: &str) -> Result<String, ShellError> {
        self.next(prompt)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ShellError> {
        let answer = self.next(prompt)?;
        Ok(match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => default,
        })
    }
}

/// Answers supplied up front; the shell only prompts for what is missing.
#[derive(Debug, Clone, Default)]
pub struct Presets {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub supply: Option<String>,
    pub transfers: Option<String>,
    pub amount: Option<String>,
    pub skip_transfers: bool,
}

/// What a completed session produced.
#[derive(Debug)]
pub struct Session {
    /// The deployed token
    pub token: DeployedContract,
    /// Transfer rows, `None` when transfers were declined
    pub report: Option<TransferReport>,
}

/// Drives one session.
pub struct Shell<P, K> {
    prompter: P,
    deployer: TokenDeployer<K>,
    presets: Presets,
    console: Console,
}

impl<P: Prompter, K: ContractCompiler> Shell<P, K> {
    pub fn new(prompter: P, deployer: TokenDeployer<K>, presets: Presets, console: Console) -> Self {
        Self { prompter, deployer, presets, console }
    }

    #[cfg(test)]
    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Run the session. `connect` is awaited once, after the token parameters
    /// have been validated.
    pub async fn run<C, F, Fut>(&mut self, connect: F) -> Result<Session, ShellError>
    where
        C: TokenChain,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, DeployError>>,
    {
        self.console.section("Token parameters");
        let params = self.token_parameters()?;
        info!(name = params.name(), symbol = params.symbol(), supply = %params.total_supply(), "token parameters accepted");

        self.console.section("Deployment");
        self.console.step("Loading signer and connecting to the network");
        let chain = connect().await?;
        let token = self.deployer.deploy(&chain, &params, &mut self.console).await?;

        if !self.wants_transfers()? {
            debug!("transfers declined");
            return Ok(Session { token, report: None });
        }

        self.console.section("Transfers");
        let preset = self.presets.transfers.take();
        let count = parse_count("transfer count", &self.ask("Number of transfers", preset)?)?;
        let preset = self.presets.amount.take();
        let amount: TokenAmount = self.ask("Amount per transfer", preset)?.parse()?;

        let report = run_transfers(&chain, &token, count, &amount, &mut self.console).await?;
        self.console.summary(&report);

        Ok(Session { token, report: Some(report) })
    }

    fn token_parameters(&mut self) -> Result<TokenParameters, ShellError> {
        let preset = self.presets.name.take();
        let name = self.ask("Token name", preset)?;
        let preset = self.presets.symbol.take();
        let symbol = self.ask("Token symbol", preset)?;
        let preset = self.presets.supply.take();
        let supply = self.ask("Total supply", preset)?;

        let supply = parse_positive_integer("total supply", &supply)?;
        Ok(TokenParameters::new(name, symbol, supply)?)
    }

    fn wants_transfers(&mut self) -> Result<bool, ShellError> {
        if self.presets.skip_transfers {
            return Ok(false);
        }
        if self.presets.transfers.is_some() {
            return Ok(true);
        }
        self.prompter.confirm("Send test transfers to random addresses?", true)
    }

    fn ask(&mut self, prompt: &str, preset: Option<String>) -> Result<String, ShellError> {
        match preset {
            Some(value) => {
                self.console.step(&format!("{prompt}: {value}"));
                Ok(value)
            }
            None => self.prompter.text(prompt),
        }
    }
}
