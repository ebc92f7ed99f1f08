use alloy_primitives::hex;
use amm_bridge::{AmmBridge, Method};
use clap::Parser;
use serde::Serialize;

use crate::common::Result;

/// List the selectors of every bridge method
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Print the table as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Row {
    method: &'static str,
    selector: String,
    signature: String,
    kind: &'static str,
    base_gas: u64,
}

impl Cmd {
    /// Execute the selectors command
    pub fn run(&self) -> Result<()> {
        let bridge = AmmBridge::default();
        let registry = bridge.registry()?;
        let rows: Vec<Row> = registry
            .iter()
            .map(|descriptor| Row {
                method: descriptor.method.name(),
                selector: hex::encode_prefixed(descriptor.selector()),
                signature: descriptor.function.signature(),
                kind: kind(descriptor.method),
                base_gas: descriptor.method.base_gas(),
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            for row in rows {
                println!("{} {:<11} {:>6} {}", row.selector, row.kind, row.base_gas, row.signature);
            }
        }
        Ok(())
    }
}

const fn kind(method: Method) -> &'static str {
    if method.is_transaction() {
        "transaction"
    } else {
        "query"
    }
}
