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

//! Terminal presentation: banner, step lines, spinners and the transfer table.

use std::time::Duration;

use alloy_primitives::{utils::format_ether, Address, U256};
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use tokenforge_engine::{
    DeployEvent, DeployObserver, TransferEvent, TransferObserver, TransferOutcome, TransferReport,
    TransferStatus,
};

const SPINNER_TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Renders workflow progress on the terminal.
#[derive(Debug)]
pub struct Console {
    spinners: bool,
    spinner: Option<ProgressBar>,
    batch_total: usize,
}

impl Console {
    /// `spinners` toggles the animated indicators shown while waiting on the network.
    pub fn new(spinners: bool) -> Self {
        Self { spinners, spinner: None, batch_total: 0 }
    }

    pub fn banner(&self) {
        println!();
        println!("{}", "╔══════════════════════════════════════╗".cyan());
        println!("{}", "║     🔨 TokenForge · ERC-20 toolkit    ║".cyan().bold());
        println!("{}", "╚══════════════════════════════════════╝".cyan());
        println!();
    }

    pub fn section(&self, title: &str) {
        println!();
        println!("{}", format!("▶ {title}").bold());
    }

    pub fn step(&mut self, message: &str) {
        self.clear_spinner();
        println!("  {} {message}", "•".cyan());
    }

    pub fn success(&mut self, message: &str) {
        self.clear_spinner();
        println!("  {} {message}", "✔".green().bold());
    }

    pub fn field(&self, key: &str, value: impl std::fmt::Display) {
        println!("    {} {value}", format!("{key}:").dark_grey());
    }

    /// Printed on stderr.
    pub fn failure(&mut self, message: &str) {
        self.clear_spinner();
        eprintln!("  {} {}", "✘".red().bold(), message.red());
    }

    pub fn summary(&mut self, report: &TransferReport) {
        self.clear_spinner();
        let total = report.outcomes.len();
        let line = format!("{}/{total} transfers succeeded", report.succeeded());
        println!();
        if report.failed() == 0 {
            println!("  {} {}", "✔".green().bold(), line.green());
        } else {
            println!("  {} {} ({} failed)", "⚠".yellow().bold(), line.yellow(), report.failed());
        }
    }

    fn spin(&mut self, message: String) {
        self.clear_spinner();
        if !self.spinners {
            println!("  {} {message}", "…".dark_grey());
            return;
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(bar);
    }

    fn clear_spinner(&mut self) {
        if let Some(bar) = self.spinner.take() {
            bar.finish_and_clear();
        }
    }

    fn table_header(&self) {
        println!(
            "  {}",
            format!("{:>7}  {:<42}  {}", "#", "Recipient", "Result").bold().underlined()
        );
    }

    fn table_row(&mut self, outcome: &TransferOutcome, total: usize) {
        self.clear_spinner();
        let (position, recipient, result) = row_cells(outcome, total);
        let result = match outcome.status {
            TransferStatus::Success(_) => format!("✅ {result}").green(),
            TransferStatus::Failed(_) => format!("❌ {result}").red(),
        };
        println!("  {position:>7}  {recipient:<42}  {result}");
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

fn spinner_style() -> ProgressStyle {
    match ProgressStyle::with_template("  {spinner:.green} {msg}") {
        Ok(style) => style.tick_chars(SPINNER_TICKS),
        Err(_) => ProgressStyle::default_spinner(),
    }
}

/// Unstyled cells of a transfer table row: position, recipient, result.
pub fn row_cells(outcome: &TransferOutcome, total: usize) -> (String, String, String) {
    let position = format!("{}/{total}", outcome.index + 1);
    let result = match &outcome.status {
        TransferStatus::Success(tx_hash) => format!("confirmed {tx_hash}"),
        TransferStatus::Failed(reason) => format!("failed: {reason}"),
    };
    (position, outcome.request.recipient.to_string(), result)
}

fn short(address: Address) -> String {
    let full = address.to_string();
    format!("{}…{}", &full[..8], &full[full.len() - 6..])
}

impl DeployObserver for Console {
    fn on_event(&mut self, event: DeployEvent<'_>) {
        match event {
            DeployEvent::FundsChecked { account, balance } => {
                self.success(&format!("Account {} holds {} ETH", short(account), format_ether(balance)));
            }
            DeployEvent::Compiling { contract } => {
                self.spin(format!("Compiling {contract}..."));
            }
            DeployEvent::Compiled { bytecode_len } => {
                self.success(&format!("Compiled ({bytecode_len} bytes of bytecode)"));
            }
            DeployEvent::Submitting { gas_limit } => {
                self.spin(format!("Waiting for the deployment to confirm (gas limit {gas_limit})..."));
            }
            DeployEvent::Deployed { address, tx_hash, gas_used } => {
                self.success("Token deployed");
                self.field("Address", address);
                self.field("Transaction", tx_hash);
                self.field("Gas used", gas_used);
            }
        }
    }
}

impl TransferObserver for Console {
    fn on_event(&mut self, event: TransferEvent<'_>) {
        match event {
            TransferEvent::Started { total, decimals, amount } => {
                self.batch_total = total;
                self.step(&format!(
                    "Sending {total} transfer(s) of {} tokens each",
                    display_units(amount, decimals)
                ));
                if total > 0 {
                    self.table_header();
                }
            }
            TransferEvent::Pending { index, total, recipient } => {
                self.spin(format!("[{}/{total}] sending to {recipient}", index + 1));
            }
            TransferEvent::Finished(outcome) => self.table_row(outcome, self.batch_total),
        }
    }
}

/// Format base units as a decimal string with `decimals` fractional digits, trailing zeros cut.
pub fn display_units(amount: U256, decimals: u8) -> String {
    let base = U256::from(10).pow(U256::from(decimals));
    let whole = amount / base;
    let fraction = amount % base;
    if fraction.is_zero() {
        return whole.to_string();
    }

    let digits = format!("{fraction:0>width$}", width = decimals as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::TxHash;
    use tokenforge_engine::TransferRequest;

    fn outcome(index: usize, status: TransferStatus) -> TransferOutcome {
        TransferOutcome {
            index,
            request: TransferRequest { recipient: Address::repeat_byte(0xab), amount: U256::from(1) },
            status,
        }
    }

    #[test]
    fn test_row_cells_success() {
        let hash = TxHash::repeat_byte(0x01);
        let (position, recipient, result) =
            row_cells(&outcome(0, TransferStatus::Success(hash)), 3);

        assert_eq!(position, "1/3");
        assert_eq!(recipient, Address::repeat_byte(0xab).to_string());
        assert_eq!(result, format!("confirmed {hash}"));
    }

    #[test]
    fn test_row_cells_failure_keeps_reason() {
        let (position, _, result) =
            row_cells(&outcome(2, TransferStatus::Failed("reverted".into())), 5);

        assert_eq!(position, "3/5");
        assert_eq!(result, "failed: reverted");
    }

    #[test]
    fn test_display_units() {
        let one = U256::from(10).pow(U256::from(18));
        assert_eq!(display_units(one * U256::from(5), 18), "5");
        assert_eq!(display_units(one / U256::from(2), 18), "0.5");
        assert_eq!(display_units(U256::from(1_250_000), 6), "1.25");
        assert_eq!(display_units(U256::from(7), 0), "7");
    }

    #[test]
    fn test_short_address() {
        let short = short(Address::repeat_byte(0xab));
        assert!(short.starts_with("0x"));
        assert!(short.contains('…'));
    }
}
