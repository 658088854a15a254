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

use assert_cmd::Command;
use predicates::prelude::*;
use tokenforge_common::{env::PRIVATE_KEY, logging::ensure_test_logging};
use tracing::info;

/// A command that never reads a `.env` file or a real key and never touches the network.
fn tokenforge(workdir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tokenforge").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove(PRIVATE_KEY)
        .env("NO_COLOR", "1")
        .args(["--rpc-url", "http://127.0.0.1:1", "--no-log-file", "--no-spinner"]);
    cmd
}

#[test]
fn test_help_command() {
    ensure_test_logging(None);
    info!("Testing CLI help command");

    let mut cmd = Command::cargo_bin("tokenforge").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deploy an ERC-20 token"))
        .stdout(predicate::str::contains("--skip-transfers"));
}

#[test]
fn test_version_command() {
    ensure_test_logging(None);
    info!("Running test");
    let mut cmd = Command::cargo_bin("tokenforge").unwrap();
    cmd.arg("--version").assert().success().stdout(predicate::str::contains("tokenforge"));
}

#[test]
fn test_missing_private_key() {
    ensure_test_logging(None);
    info!("Running test");
    let workdir = tempfile::tempdir().unwrap();
    tokenforge(&workdir)
        .args(["--name", "Seismic", "--symbol", "SEI", "--supply", "1000", "--skip-transfers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(PRIVATE_KEY));

    // Nothing was compiled, so the source was never written.
    assert!(!workdir.path().join("Token.sol").exists());
}

#[test]
fn test_invalid_supply_rejected() {
    ensure_test_logging(None);
    info!("Running test");
    let workdir = tempfile::tempdir().unwrap();
    tokenforge(&workdir)
        .args(["--name", "Seismic", "--symbol", "SEI", "--supply", "0", "--skip-transfers"])
        .env("PRIVATE_KEY", "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
        .assert()
        .failure()
        .stderr(predicate::str::contains("total supply must be a positive integer"));
}

#[test]
fn test_non_numeric_supply_rejected() {
    ensure_test_logging(None);
    info!("Running test");
    let workdir = tempfile::tempdir().unwrap();
    tokenforge(&workdir)
        .args(["--name", "Seismic", "--symbol", "SEI", "--supply", "lots", "--skip-transfers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("`lots`"));
}

#[test]
fn test_transfers_conflict_with_skip() {
    ensure_test_logging(None);
    info!("Running test");
    let workdir = tempfile::tempdir().unwrap();
    tokenforge(&workdir)
        .args(["--transfers", "3", "--skip-transfers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
