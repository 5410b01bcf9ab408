// Mock RPC Node Step Definitions
//
// Steps that script the mock node's chain state and inspect the calls it received.

use cucumber::{given, then};
use serde_json::json;

use super::common::ProxyWorld;

#[given(expr = "the node is at slot {int} with {int} validators")]
async fn chain_tip(world: &mut ProxyWorld, slot: u64, validators: usize) {
    world.node().with_state(|s| {
        s.slot = slot;
        s.validator_count = validators;
    });
}

#[given(expr = "the node is in epoch {int} at slot index {int} of {int}")]
async fn epoch_position(world: &mut ProxyWorld, epoch: u64, slot_index: u64, slots_in_epoch: u64) {
    world.node().with_state(|s| {
        s.epoch = epoch;
        s.slot_index = slot_index;
        s.slots_in_epoch = slots_in_epoch;
    });
}

#[given(expr = "the node has {int} performance samples of {int} transactions over {int} seconds")]
async fn performance_samples(world: &mut ProxyWorld, count: u64, transactions: u64, period: u64) {
    world.node().with_state(|s| {
        // Newest first, as the real node returns them.
        s.performance_samples = (0..count)
            .rev()
            .map(|i| {
                json!({
                    "slot": 1000 + i * 150,
                    "numTransactions": transactions,
                    "numSlots": 150,
                    "samplePeriodSecs": period,
                })
            })
            .collect();
    });
}

#[given(expr = "the account {string} holds {int} lamports")]
async fn account_balance(world: &mut ProxyWorld, address: String, lamports: u64) {
    world.node().with_state(|s| {
        s.balances.insert(address, lamports);
    });
}

#[given(expr = "the mint {string} has a supply of {int} with {int} decimals")]
async fn token_supply(world: &mut ProxyWorld, mint: String, supply: u64, decimals: u8) {
    world.node().with_state(|s| {
        s.token_supplies.insert(mint, (supply, decimals));
    });
}

#[given(expr = "the mint {string} has holders {string}")]
async fn token_holders(world: &mut ProxyWorld, mint: String, holders: String) {
    let holders: Vec<(String, u64)> = holders
        .split(',')
        .map(|entry| {
            let (address, amount) = entry.split_once(':').expect("holders are written as address:amount");
            (address.trim().to_string(), amount.trim().parse().expect("amount is an integer"))
        })
        .collect();
    world.node().with_state(|s| {
        s.token_holders.insert(mint, holders);
    });
}

#[given(expr = "the node throttles {string} {int} time(s)")]
async fn throttle(world: &mut ProxyWorld, method: String, times: u32) {
    world.node().with_state(|s| {
        s.throttled.insert(method, times);
    });
}

#[given(expr = "the node sends Retry-After {string}")]
async fn retry_after(world: &mut ProxyWorld, value: String) {
    world.node().with_state(|s| {
        s.retry_after = Some(value);
    });
}

#[given("the node is down")]
async fn node_down(world: &mut ProxyWorld) {
    world.node().with_state(|s| s.down = true);
}

#[then(expr = "the node received {int} {string} call(s)")]
async fn received_calls(world: &mut ProxyWorld, expected: u32, method: String) {
    assert_eq!(
        world.node().calls(&method),
        expected,
        "unexpected number of {} calls",
        method
    );
}
