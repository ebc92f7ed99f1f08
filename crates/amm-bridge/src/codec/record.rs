//! Shape-agnostic access to decoded ABI values.
//!
//! Upstream decoders hand structs over either as ordered tuples or as name-keyed structs. Both
//! are normalized here into a [`Record`], so callers read fields by position and never match on
//! the shape themselves.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};

use crate::{
    types::{Amount, AmountError, Coin},
    BridgeError,
};

/// Field names of `Coin`.
pub const COIN_FIELDS: &[&str] = &["denom", "amount"];
/// Field names of `SwapAmountInRoute`.
pub const ROUTE_FIELDS: &[&str] = &["poolId", "tokenOutDenom"];
/// Field names of `Affiliate`.
pub const AFFILIATE_FIELDS: &[&str] = &["addr", "basisPointsFee"];
/// Field names of `IBCTransferInfo`.
pub const IBC_INFO_FIELDS: &[&str] = &["sourceChannel", "receiver", "memo", "timeoutTimestamp"];

/// The raw shape of a decoded value.
#[derive(Debug)]
pub enum Raw<'a> {
    /// Ordered fields.
    Tuple(&'a [DynSolValue]),
    /// Name-keyed fields.
    Map(Vec<(&'a str, &'a DynSolValue)>),
    /// Anything else.
    Scalar(&'a DynSolValue),
}

impl<'a> Raw<'a> {
    /// Classifies a decoded value.
    pub fn of(value: &'a DynSolValue) -> Self {
        match value {
            DynSolValue::Tuple(fields) => Self::Tuple(fields),
            DynSolValue::CustomStruct { prop_names, tuple, .. } => {
                Self::Map(prop_names.iter().map(String::as_str).zip(tuple.iter()).collect())
            }
            other => Self::Scalar(other),
        }
    }
}

/// A struct-like value with known field names, readable by position.
#[derive(Debug)]
pub struct Record<'a> {
    path: String,
    fields: &'static [&'static str],
    raw: Raw<'a>,
}

impl<'a> Record<'a> {
    /// Wraps the decoded arguments of a call. The argument count must match exactly.
    pub fn arguments(
        values: &'a [DynSolValue],
        fields: &'static [&'static str],
    ) -> Result<Self, BridgeError> {
        if values.len() != fields.len() {
            return Err(BridgeError::invalid_input(format!(
                "expected {} arguments, got {}",
                fields.len(),
                values.len()
            )));
        }
        Ok(Self { path: String::new(), fields, raw: Raw::Tuple(values) })
    }

    /// Wraps a struct value located at `path`.
    pub fn new(
        value: &'a DynSolValue,
        path: String,
        fields: &'static [&'static str],
    ) -> Result<Self, BridgeError> {
        let raw = Raw::of(value);
        match &raw {
            Raw::Scalar(_) => {
                return Err(BridgeError::invalid_input(format!("{path} must be a tuple")));
            }
            Raw::Tuple(values) if values.len() != fields.len() => {
                return Err(BridgeError::invalid_input(format!(
                    "{path} expects {} fields, got {}",
                    fields.len(),
                    values.len()
                )));
            }
            Raw::Tuple(_) | Raw::Map(_) => {}
        }
        Ok(Self { path, fields, raw })
    }

    /// The positional path of field `index`, such as `tokenInMaxs[1].amount`.
    pub fn path(&self, index: usize) -> String {
        let name = self.fields.get(index).copied().unwrap_or("?");
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path)
        }
    }

    /// Returns field `index`, looked up by position or by name depending on the shape.
    pub fn get(&self, index: usize) -> Result<&'a DynSolValue, BridgeError> {
        let missing = || BridgeError::invalid_input(format!("{} is missing", self.path(index)));
        match &self.raw {
            Raw::Tuple(values) => values.get(index).ok_or_else(missing),
            Raw::Map(entries) => {
                let wanted = normalize(self.fields.get(index).copied().ok_or_else(missing)?);
                entries
                    .iter()
                    .find(|(name, _)| normalize(name) == wanted)
                    .map(|(_, value)| *value)
                    .ok_or_else(missing)
            }
            Raw::Scalar(_) => Err(missing()),
        }
    }

    /// Reads a `uint64` field.
    pub fn u64(&self, index: usize) -> Result<u64, BridgeError> {
        to_u64(self.get(index)?, &self.path(index))
    }

    /// Reads an amount field.
    pub fn amount(&self, index: usize) -> Result<Amount, BridgeError> {
        to_amount(self.get(index)?, &self.path(index))
    }

    /// Reads a string field.
    pub fn string(&self, index: usize) -> Result<String, BridgeError> {
        to_string(self.get(index)?, &self.path(index))
    }

    /// Reads an address field.
    pub fn address(&self, index: usize) -> Result<Address, BridgeError> {
        match self.get(index)? {
            DynSolValue::Address(address) => Ok(*address),
            _ => Err(type_mismatch(&self.path(index), "an address")),
        }
    }

    /// Reads a nested struct field.
    pub fn record(
        &self,
        index: usize,
        fields: &'static [&'static str],
    ) -> Result<Record<'a>, BridgeError> {
        Record::new(self.get(index)?, self.path(index), fields)
    }

    /// Reads an array field, returning each element with its positional path.
    pub fn array(&self, index: usize) -> Result<Vec<(String, &'a DynSolValue)>, BridgeError> {
        let path = self.path(index);
        match self.get(index)? {
            DynSolValue::Array(items) | DynSolValue::FixedArray(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, item)| (format!("{path}[{i}]"), item))
                .collect()),
            _ => Err(type_mismatch(&path, "an array")),
        }
    }

    /// Reads a `Coin` field.
    pub fn coin(&self, index: usize) -> Result<Coin, BridgeError> {
        decode_coin(self.get(index)?, self.path(index))
    }

    /// Reads a `Coin[]` field.
    pub fn coins(&self, index: usize) -> Result<Vec<Coin>, BridgeError> {
        self.array(index)?.into_iter().map(|(path, item)| decode_coin(item, path)).collect()
    }
}

/// Decodes a `Coin` from either shape.
pub fn decode_coin(value: &DynSolValue, path: String) -> Result<Coin, BridgeError> {
    let coin = Record::new(value, path, COIN_FIELDS)?;
    Ok(Coin { denom: coin.string(0)?, amount: coin.amount(1)? })
}

/// Field names compare case-insensitively and ignoring underscores, so `pool_id` matches
/// `poolId`.
fn normalize(name: &str) -> String {
    name.chars().filter(|c| *c != '_').map(|c| c.to_ascii_lowercase()).collect()
}

fn type_mismatch(path: &str, expected: &str) -> BridgeError {
    BridgeError::invalid_input(format!("{path} must be {expected}"))
}

fn to_u64(value: &DynSolValue, path: &str) -> Result<u64, BridgeError> {
    match value {
        DynSolValue::Uint(value, _) => u64::try_from(*value).map_err(|_| {
            BridgeError::invalid_input(format!("{path} exceeds maximum of {}", u64::MAX))
        }),
        _ => Err(type_mismatch(path, "an unsigned integer")),
    }
}

fn to_amount(value: &DynSolValue, path: &str) -> Result<Amount, BridgeError> {
    let magnitude = match value {
        DynSolValue::Uint(value, _) => *value,
        DynSolValue::Int(value, _) if value.is_negative() => {
            return Err(BridgeError::invalid_input(format!("{path} cannot be negative")));
        }
        DynSolValue::Int(value, _) => value.into_raw(),
        _ => return Err(type_mismatch(path, "an integer")),
    };
    Amount::new(magnitude).map_err(|err| amount_error(path, &err, magnitude))
}

fn amount_error(path: &str, err: &AmountError, value: U256) -> BridgeError {
    match err {
        AmountError::Overflow => BridgeError::invalid_input(format!(
            "{path} overflow: exceeds maximum of 2^255-1"
        ))
        .with_detail(format!("got {value}")),
        other => BridgeError::invalid_input(format!("{path} {other}")),
    }
}

fn to_string(value: &DynSolValue, path: &str) -> Result<String, BridgeError> {
    match value {
        DynSolValue::String(value) => Ok(value.clone()),
        _ => Err(type_mismatch(path, "a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    fn uint(value: u64, bits: usize) -> DynSolValue {
        DynSolValue::Uint(U256::from(value), bits)
    }

    fn coin_tuple(denom: &str, amount: u64) -> DynSolValue {
        DynSolValue::Tuple(vec![DynSolValue::String(denom.into()), uint(amount, 256)])
    }

    fn coin_struct(denom: &str, amount: u64) -> DynSolValue {
        DynSolValue::CustomStruct {
            name: "Coin".into(),
            prop_names: vec!["denom".into(), "amount".into()],
            tuple: vec![DynSolValue::String(denom.into()), uint(amount, 256)],
        }
    }

    #[test]
    fn test_both_shapes_decode_to_the_same_coin() {
        let from_tuple = decode_coin(&coin_tuple("uatom", 5), "tokenIn".into()).unwrap();
        let from_struct = decode_coin(&coin_struct("uatom", 5), "tokenIn".into()).unwrap();
        assert_eq!(from_tuple, from_struct);
        assert_eq!(from_tuple, Coin::new("uatom", 5u64));
    }

    #[test]
    fn test_map_lookup_ignores_case_and_underscores() {
        let value = DynSolValue::CustomStruct {
            name: "SwapAmountInRoute".into(),
            prop_names: vec!["token_out_denom".into(), "pool_id".into()],
            tuple: vec![DynSolValue::String("uosmo".into()), uint(3, 64)],
        };
        let route = Record::new(&value, "routes[0]".into(), ROUTE_FIELDS).unwrap();
        assert_eq!(route.u64(0).unwrap(), 3);
        assert_eq!(route.string(1).unwrap(), "uosmo");
    }

    #[test]
    fn test_missing_field_reports_position() {
        let value = DynSolValue::CustomStruct {
            name: "Coin".into(),
            prop_names: vec!["denom".into()],
            tuple: vec![DynSolValue::String("uatom".into())],
        };
        let err = decode_coin(&value, "tokenInMaxs[1]".into()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert!(err.message().contains("tokenInMaxs[1].amount is missing"));
    }

    #[test]
    fn test_tuple_arity_is_checked() {
        let value = DynSolValue::Tuple(vec![DynSolValue::String("uatom".into())]);
        let err = decode_coin(&value, "tokenIn".into()).unwrap_err();
        assert!(err.message().contains("tokenIn expects 2 fields, got 1"));

        let err = Record::arguments(&[uint(1, 64)], &["poolId", "shareOutAmount"]).unwrap_err();
        assert!(err.message().contains("expected 2 arguments, got 1"));
    }

    #[test]
    fn test_amount_overflow_and_sign() {
        let args = [DynSolValue::Uint(U256::MAX, 256)];
        let record = Record::arguments(&args, &["shareOutAmount"]).unwrap();
        let err = record.amount(0).unwrap_err();
        assert!(err.message().contains("shareOutAmount overflow"));

        let args = [DynSolValue::Int(alloy_primitives::I256::MINUS_ONE, 256)];
        let record = Record::arguments(&args, &["shareOutAmount"]).unwrap();
        let err = record.amount(0).unwrap_err();
        assert!(err.message().contains("cannot be negative"));
    }

    #[test]
    fn test_coins_paths() {
        let args =
            [DynSolValue::Array(vec![coin_tuple("uatom", 1), DynSolValue::Bool(true)])];
        let record = Record::arguments(&args, &["tokenInMaxs"]).unwrap();
        let err = record.coins(0).unwrap_err();
        assert!(err.message().contains("tokenInMaxs[1] must be a tuple"));
    }
}
