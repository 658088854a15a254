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

use alloy_primitives::U256;
use tokenforge_engine::{
    query, run_transfers,
    test_utils::{MockChain, StaticCompiler},
    TokenAmount, TokenChain, TokenDeployer, TokenParameters,
};
use tracing::info;

fn tokens(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10).pow(U256::from(18))
}

#[tokio::test]
async fn test_deploy_then_transfer() {
    tokenforge_common::logging::ensure_test_logging(None);
    info!("Running test");
    let chain = MockChain::funded();
    let deployer = TokenDeployer::new(StaticCompiler::token());

    let params = TokenParameters::new("Seismic", "SEI", U256::from(1000)).unwrap();
    let token = deployer.deploy(&chain, &params, &mut ()).await.unwrap();
    assert_eq!(query::total_supply(&chain, &token).await.unwrap(), tokens(1000));

    let amount: TokenAmount = "10".parse().unwrap();
    let report = run_transfers(&chain, &token, 4, &amount, &mut ()).await.unwrap();

    assert_eq!(report.succeeded(), 4);
    for outcome in &report.outcomes {
        let held = query::balance_of(&chain, &token, outcome.request.recipient).await.unwrap();
        assert_eq!(held, tokens(10));
    }
    assert_eq!(query::balance_of(&chain, &token, chain.account()).await.unwrap(), tokens(960));
}

#[tokio::test]
async fn test_one_failure_in_five() {
    tokenforge_common::logging::ensure_test_logging(None);
    info!("Running test");
    let chain = MockChain::funded().fail_send(3);
    let deployer = TokenDeployer::new(StaticCompiler::token());

    let params = TokenParameters::new("Seismic", "SEI", U256::from(1000)).unwrap();
    let token = deployer.deploy(&chain, &params, &mut ()).await.unwrap();

    let amount: TokenAmount = "1".parse().unwrap();
    let report = run_transfers(&chain, &token, 5, &amount, &mut ()).await.unwrap();

    assert_eq!(chain.send_count(), 5);
    assert_eq!(report.succeeded(), 4);
    assert_eq!(report.failed(), 1);
    let failed: Vec<_> =
        report.outcomes.iter().filter(|o| !o.is_success()).map(|o| o.index).collect();
    assert_eq!(failed, vec![2]);
    assert_eq!(query::balance_of(&chain, &token, chain.account()).await.unwrap(), tokens(996));
}
