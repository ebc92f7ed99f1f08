//! Build script that validates the embedded bridge ABI and exports its selector table.
//!
//! This script:
//! 1. Parses `abi/IAmmBridge.json` into a `JsonAbi`
//! 2. Checks that every required method is present exactly once and that no two selectors collide
//! 3. Generates Rust constants for each method selector plus the schema hash

use std::{collections::BTreeMap, env, fs, io::Write, path::Path};

use alloy_json_abi::{JsonAbi, StateMutability};
use alloy_primitives::{hex, keccak256};

/// Methods the precompile dispatches. The build fails if one of them is missing from the schema.
const REQUIRED_METHODS: &[&str] = &[
    "joinPool",
    "exitPool",
    "swapExactAmountIn",
    "swapExactAmountInWithIBCTransfer",
    "getPool",
    "getPools",
    "getPoolType",
    "getPoolParams",
    "getTotalShares",
    "getTotalLiquidity",
    "calcJoinPoolNoSwapShares",
    "calcExitPoolCoinsFromShares",
    "calcJoinPoolShares",
    "joinPoolJson",
    "exitPoolJson",
    "swapExactAmountInJson",
    "swapExactAmountInWithIBCTransferJson",
    "getPoolJson",
    "getPoolsJson",
    "calcJoinPoolNoSwapSharesJson",
    "calcExitPoolCoinsFromSharesJson",
    "calcJoinPoolSharesJson",
];

/// Converts a camelCase method name into a SCREAMING_SNAKE_CASE constant name.
fn const_name(method: &str) -> String {
    let chars: Vec<char> = method.chars().collect();
    let mut out = String::with_capacity(method.len() + 8);
    for (i, c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev_lower = chars[i - 1].is_ascii_lowercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev_lower || (chars[i - 1].is_ascii_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let out_dir = env::var("OUT_DIR").unwrap();
    let crate_dir = Path::new(&manifest_dir);

    let abi_path = crate_dir.join("abi/IAmmBridge.json");
    println!("cargo::rerun-if-changed={}", abi_path.display());

    let content = fs::read(&abi_path).expect("Failed to read abi/IAmmBridge.json");
    let abi: JsonAbi =
        serde_json::from_slice(&content).expect("Failed to parse abi/IAmmBridge.json");

    let mut functions = BTreeMap::new();
    let mut selectors = BTreeMap::new();
    for (name, overloads) in &abi.functions {
        let [function] = overloads.as_slice() else {
            panic!("Method {name} is declared more than once; overloads are not supported");
        };
        let signature = function.signature();
        let selector = function.selector().0;

        if let Some(other) = selectors.insert(selector, signature.clone()) {
            panic!("Selector collision between {other} and {signature}");
        }
        assert!(
            matches!(function.state_mutability, StateMutability::View | StateMutability::NonPayable),
            "Method {name} has unsupported state mutability {}",
            function.state_mutability.as_json_str()
        );
        functions.insert(name.clone(), (signature, selector));
    }

    for method in REQUIRED_METHODS {
        assert!(functions.contains_key(*method), "Required method {method} is missing from the ABI");
    }

    let generated_path = Path::new(&out_dir).join("selectors.rs");
    let mut file = fs::File::create(&generated_path).expect("Failed to create generated file");

    writeln!(file, "// Auto-generated IAmmBridge selector constants.").unwrap();
    writeln!(file, "// DO NOT EDIT - generated by build.rs from abi/IAmmBridge.json").unwrap();
    writeln!(file).unwrap();

    for (name, (signature, selector)) in &functions {
        writeln!(file, "/// Selector of `{signature}`").unwrap();
        writeln!(
            file,
            "pub const {}: [u8; 4] = hex!(\"{}\");",
            const_name(name),
            hex::encode(selector)
        )
        .unwrap();
    }
    writeln!(file).unwrap();

    writeln!(file, "/// Every method of the schema as `(name, canonical signature, selector)`.").unwrap();
    writeln!(file, "pub const ALL: &[(&str, &str, [u8; 4])] = &[").unwrap();
    for (name, (signature, _)) in &functions {
        writeln!(file, "    (\"{name}\", \"{signature}\", {}),", const_name(name)).unwrap();
    }
    writeln!(file, "];").unwrap();
    writeln!(file).unwrap();

    writeln!(file, "/// Keccak-256 hash of the embedded ABI schema.").unwrap();
    writeln!(file, "pub const ABI_HASH: B256 = b256!(\"{}\");", hex::encode(keccak256(&content)))
        .unwrap();
}
