use std::collections::BTreeMap;

use alloy_primitives::{hex, Address};
use amm_bridge::{
    memory::{MemoryEngine, MemoryHost},
    Amount, Coin, Event, Sender,
};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use crate::common::{BridgeArgs, CliError, InputArgs, Result};

/// Run calldata against an in-memory engine
///
/// The engine starts with two balancer pools: pool 1 holds `uatom`/`uosmo` and pool 2 holds
/// `uosmo`/`uion`. The caller is funded with the `--fund` coins before the call.
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Calldata to run
    #[command(flatten)]
    pub input_args: InputArgs,

    /// Bridge deployment
    #[command(flatten)]
    pub bridge_args: BridgeArgs,

    /// EVM caller of the precompile
    #[arg(long, default_value = "0x1111111111111111111111111111111111111111")]
    pub caller: Address,

    /// Block timestamp in seconds
    #[arg(long, default_value_t = 1_700_000_000)]
    pub timestamp: u64,

    /// Run as a STATICCALL
    #[arg(long = "static")]
    pub is_static: bool,

    /// Coin credited to the caller before the call, as `<amount><denom>`. Repeatable.
    #[arg(long, value_parser = parse_coin)]
    pub fund: Vec<Coin>,
}

/// Result of a simulated call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Outcome {
    success: bool,
    gas_used: u64,
    output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    events: Vec<EventOutput>,
}

#[derive(Debug, Serialize)]
struct EventOutput {
    #[serde(rename = "type")]
    kind: String,
    attributes: BTreeMap<String, String>,
}

impl From<Event> for EventOutput {
    fn from(event: Event) -> Self {
        Self { kind: event.kind.to_string(), attributes: event.attributes.into_iter().collect() }
    }
}

impl Cmd {
    /// Execute the call command
    pub fn run(&self) -> Result<()> {
        let outcome = self.execute()?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        Ok(())
    }

    fn execute(&self) -> Result<Outcome> {
        let input = self.input_args.load()?;
        let bridge = self.bridge_args.bridge();

        let mut engine = MemoryEngine::default();
        if !self.fund.is_empty() {
            let owner = Sender::from_caller(self.caller, &bridge.config().bech32_prefix)?;
            engine.fund(owner.bech32(), &self.fund);
        }
        let mut host = MemoryHost::new(self.caller).with_timestamp(self.timestamp);

        let gas_used = bridge.required_gas(&input);
        let result = bridge.call(&mut host, &mut engine, &input, self.is_static);
        let (output, error) = match result {
            Ok(output) => {
                info!(gas_used, "Call succeeded");
                (output, None)
            }
            Err(err) => {
                warn!(%err, "Call failed");
                (err.abi_encode_revert(), Some(err.to_string()))
            }
        };

        Ok(Outcome {
            success: error.is_none(),
            gas_used,
            output: hex::encode_prefixed(output),
            error,
            events: host.events.into_iter().map(Into::into).collect(),
        })
    }
}

/// Parses `<amount><denom>`, e.g. `1000000uatom`.
fn parse_coin(value: &str) -> Result<Coin> {
    let split = value.find(|c: char| !c.is_ascii_digit()).unwrap_or(value.len());
    let (amount, denom) = value.split_at(split);
    if amount.is_empty() || denom.is_empty() {
        return Err(CliError::InvalidInput(format!("{value}: expected <amount><denom>")));
    }
    let amount: Amount =
        amount.parse().map_err(|err| CliError::InvalidInput(format!("{value}: {err}")))?;
    Ok(Coin::new(denom, amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm_bridge::test_utils::calldata;
    use rstest::rstest;

    fn cmd(input: &[u8], fund: Vec<Coin>) -> Cmd {
        Cmd {
            input_args: InputArgs { input: Some(hex::encode(input)), input_file: None },
            bridge_args: BridgeArgs { prefix: "bb".into(), precompile: None },
            caller: Address::repeat_byte(0x11),
            timestamp: 1_700_000_000,
            is_static: false,
            fund,
        }
    }

    #[rstest]
    #[case("1000000uatom", Coin::new("uatom", 1_000_000u64))]
    #[case("5gamm/pool/1", Coin::new("gamm/pool/1", 5u64))]
    fn test_parse_coin(#[case] value: &str, #[case] expected: Coin) {
        assert_eq!(parse_coin(value).unwrap(), expected);
    }

    #[rstest]
    #[case("uatom")]
    #[case("100")]
    #[case("")]
    fn test_parse_coin_rejects(#[case] value: &str) {
        assert!(parse_coin(value).is_err());
    }

    #[test]
    fn test_funded_swap() {
        let input = calldata::swap_exact_amount_in(&[(1, "uosmo")], ("uatom", 100_000), 1, &[]);
        let outcome = cmd(&input, vec![Coin::new("uatom", 100_000u64)]).execute().unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.gas_used, 62_000);
        assert_eq!(outcome.events.len(), 2);
        assert_eq!(outcome.events[0].kind, "swap_exact_in");
        assert_eq!(outcome.events[1].attributes["success"], "true");
    }

    #[test]
    fn test_failed_call_reports_revert_data() {
        let input = calldata::swap_exact_amount_in(&[(1, "uosmo")], ("uatom", 100_000), 1, &[]);
        let outcome = cmd(&input, vec![]).execute().unwrap();
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("[code=3]"));
        assert_eq!(outcome.events.len(), 1);
    }
}
