//! The JSON alternative entry path.
//!
//! Every `*Json` method takes a single UTF-8 string holding the message of its ABI counterpart
//! in snake_case JSON, and returns the engine reply as a JSON string. A `sender` field in the
//! payload is accepted and discarded: the sender always comes from the EVM caller.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    codec::{abi::decode_values, record::Record},
    constants::bounds::MAX_STRING_LENGTH,
    message::{BridgeRequest, BridgeResponse},
    registry::{Method, MethodDescriptor},
    BridgeError,
};

/// Decodes the arguments of a JSON method, i.e. calldata without the selector.
pub fn decode_request(
    descriptor: &MethodDescriptor,
    args: &[u8],
) -> Result<BridgeRequest, BridgeError> {
    let values = decode_values(descriptor, args)?;
    let payload = Record::arguments(&values, &["payload"])?.string(0)?;
    parse_payload(descriptor.method, &payload)
}

/// Parses a JSON payload into the request of `method`'s operation.
pub fn parse_payload(method: Method, payload: &str) -> Result<BridgeRequest, BridgeError> {
    if payload.len() > MAX_STRING_LENGTH {
        return Err(BridgeError::invalid_input(format!(
            "payload exceeds maximum length of {MAX_STRING_LENGTH} bytes"
        )));
    }
    let value: Value = serde_json::from_str(payload)
        .map_err(|err| BridgeError::invalid_input("invalid JSON payload").with_detail(err))?;
    let Value::Object(mut fields) = value else {
        return Err(BridgeError::invalid_input("JSON payload must be an object"));
    };
    if fields.remove("sender").is_some() {
        debug!(target: "amm_bridge::json", %method, "ignoring payload sender");
    }

    let request = match method.operation() {
        Method::JoinPool => BridgeRequest::JoinPool(from_fields(fields)?),
        Method::ExitPool => BridgeRequest::ExitPool(from_fields(fields)?),
        Method::SwapExactAmountIn => BridgeRequest::SwapExactAmountIn(from_fields(fields)?),
        Method::SwapExactAmountInWithIbcTransfer => {
            BridgeRequest::SwapExactAmountInWithIbcTransfer(from_fields(fields)?)
        }
        Method::GetPool => BridgeRequest::GetPool(from_fields(fields)?),
        Method::GetPools => BridgeRequest::GetPools(from_fields(fields)?),
        Method::CalcJoinPoolNoSwapShares => {
            BridgeRequest::CalcJoinPoolNoSwapShares(from_fields(fields)?)
        }
        Method::CalcExitPoolCoinsFromShares => {
            BridgeRequest::CalcExitPoolCoinsFromShares(from_fields(fields)?)
        }
        Method::CalcJoinPoolShares => BridgeRequest::CalcJoinPoolShares(from_fields(fields)?),
        other => {
            return Err(
                BridgeError::internal("method has no JSON form").with_detail(other)
            );
        }
    };
    Ok(request)
}

fn from_fields<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T, BridgeError> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|err| BridgeError::invalid_input("invalid JSON payload").with_detail(err))
}

/// Encodes a reply as the single `string` output of a JSON method.
pub fn encode_response(response: &BridgeResponse) -> Result<Bytes, BridgeError> {
    let json = serde_json::to_string(response)
        .map_err(|err| BridgeError::internal("failed to encode JSON reply").with_detail(err))?;
    Ok(DynSolValue::Tuple(vec![DynSolValue::String(json)]).abi_encode_params().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        message::{MsgJoinPool, SwapResponse},
        types::{Coin, Pagination},
        ErrorCode,
    };
    use alloy_sol_types::SolCall;
    use amm_bridge_contracts::IAmmBridge;

    #[test]
    fn test_sender_is_discarded() {
        let request = parse_payload(
            Method::JoinPoolJson,
            r#"{"sender":"bb1attacker","pool_id":1,"share_out_amount":"10","token_in_maxs":[{"denom":"uatom","amount":"5"}]}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            BridgeRequest::JoinPool(MsgJoinPool {
                pool_id: 1,
                share_out_amount: 10u64.into(),
                token_in_maxs: vec![Coin::new("uatom", 5u64)],
            })
        );
    }

    #[test]
    fn test_pools_payload_is_flat() {
        let request = parse_payload(Method::GetPoolsJson, r#"{"offset":2,"limit":"50"}"#).unwrap();
        assert_eq!(request, BridgeRequest::GetPools(Pagination { offset: 2, limit: 50 }));
    }

    #[test]
    fn test_malformed_payloads_are_invalid_input() {
        for payload in [
            "not json",
            "[1,2]",
            r#"{"pool_id":1}"#,
            r#"{"pool_id":1,"share_out_amount":"-5","token_in_maxs":[]}"#,
        ] {
            let err = parse_payload(Method::JoinPoolJson, payload).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput, "{payload}");
        }
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let payload = format!(r#"{{"pool_id":"{}"}}"#, "1".repeat(MAX_STRING_LENGTH));
        let err = parse_payload(Method::GetPoolJson, &payload).unwrap_err();
        assert!(err.message().contains("payload exceeds maximum length"));
    }

    #[test]
    fn test_reply_is_a_json_string() {
        let output =
            encode_response(&BridgeResponse::Swap(SwapResponse { token_out_amount: 42u64.into() }))
                .unwrap();
        let json = IAmmBridge::swapExactAmountInJsonCall::abi_decode_returns(&output).unwrap();
        assert_eq!(json, r#"{"token_out_amount":"42"}"#);
    }
}
