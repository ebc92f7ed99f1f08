//! Per-invocation handling: decode, validate, authorize, call the engine, emit, encode.

use alloy_primitives::Bytes;
use tracing::trace;

use crate::{
    codec::abi,
    config::BridgeConfig,
    engine::{AmmEngine, EngineError},
    events::Event,
    host::PrecompileHost,
    json,
    message::{BridgeRequest, BridgeResponse},
    registry::MethodDescriptor,
    types::Sender,
    BridgeError, ErrorCode,
};

/// Handles one call of `descriptor`'s method. `args` is the calldata without the selector.
pub(crate) fn handle<H, E>(
    config: &BridgeConfig,
    descriptor: &MethodDescriptor,
    host: &mut H,
    engine: &mut E,
    args: &[u8],
) -> Result<Bytes, BridgeError>
where
    H: PrecompileHost,
    E: AmmEngine,
{
    let method = descriptor.method;
    let request = if method.is_json() {
        json::decode_request(descriptor, args)?
    } else {
        abi::decode_request(descriptor, args)?
    };
    trace!(target: "amm_bridge::handler", %method, ?request, "decoded request");

    request.validate(host.block_timestamp())?;

    let sender = if request.is_transaction() {
        Some(Sender::from_caller(host.caller(), &config.bech32_prefix)?)
    } else {
        None
    };

    let (response, event) = execute(&config.module_name, sender.as_ref(), engine, &request)?;
    if let Some(event) = event {
        host.emit_event(event);
    }

    if method.is_json() {
        json::encode_response(&response)
    } else {
        Ok(abi::encode_response(&response))
    }
}

fn execute<E: AmmEngine>(
    module: &str,
    sender: Option<&Sender>,
    engine: &mut E,
    request: &BridgeRequest,
) -> Result<(BridgeResponse, Option<Event>), BridgeError> {
    let sender = || {
        sender.ok_or_else(|| BridgeError::internal("transaction dispatched without a sender"))
    };
    let query = |err: EngineError| BridgeError::from_engine(&err, ErrorCode::QueryFailed, "query failed");

    let executed = match request {
        BridgeRequest::JoinPool(msg) => {
            let sender = sender()?;
            let reply = engine.join_pool(sender, msg).map_err(|err| {
                BridgeError::from_engine(&err, ErrorCode::JoinFailed, "join pool failed")
            })?;
            let event = Event::join_pool(module, msg.pool_id, sender, &reply);
            (BridgeResponse::JoinPool(reply), Some(event))
        }
        BridgeRequest::ExitPool(msg) => {
            let sender = sender()?;
            let reply = engine.exit_pool(sender, msg).map_err(|err| {
                BridgeError::from_engine(&err, ErrorCode::ExitFailed, "exit pool failed")
            })?;
            let event = Event::exit_pool(module, msg.pool_id, sender, &reply);
            (BridgeResponse::ExitPool(reply), Some(event))
        }
        BridgeRequest::SwapExactAmountIn(msg) => {
            let sender = sender()?;
            let reply = engine.swap_exact_amount_in(sender, msg).map_err(|err| {
                BridgeError::from_engine(&err, ErrorCode::SwapFailed, "swap failed")
            })?;
            let event = Event::swap_exact_in(
                module,
                sender,
                &msg.routes,
                &msg.token_in,
                reply.token_out_amount,
            );
            (BridgeResponse::Swap(reply), Some(event))
        }
        BridgeRequest::SwapExactAmountInWithIbcTransfer(msg) => {
            let sender = sender()?;
            let reply = engine.swap_exact_amount_in_with_ibc_transfer(sender, msg).map_err(|err| {
                BridgeError::from_engine(&err, ErrorCode::IbcFailed, "swap with IBC transfer failed")
            })?;
            let event =
                Event::swap_exact_in_ibc(module, sender, &msg.ibc_info, reply.token_out_amount);
            (BridgeResponse::Swap(reply), Some(event))
        }
        BridgeRequest::GetPool(q) => (BridgeResponse::Pool(engine.pool(q.pool_id).map_err(query)?), None),
        BridgeRequest::GetPools(page) => {
            (BridgeResponse::Pools(engine.pools(page).map_err(query)?), None)
        }
        BridgeRequest::GetPoolType(q) => {
            (BridgeResponse::PoolType(engine.pool_type(q.pool_id).map_err(query)?), None)
        }
        BridgeRequest::GetPoolParams(q) => {
            (BridgeResponse::PoolParams(engine.pool_params(q.pool_id).map_err(query)?), None)
        }
        BridgeRequest::GetTotalShares(q) => {
            (BridgeResponse::TotalShares(engine.total_shares(q.pool_id).map_err(query)?), None)
        }
        BridgeRequest::GetTotalLiquidity => {
            (BridgeResponse::TotalLiquidity(engine.total_liquidity().map_err(query)?), None)
        }
        BridgeRequest::CalcJoinPoolNoSwapShares(q) => {
            let reply = engine.calc_join_pool_no_swap_shares(q.pool_id, &q.tokens_in).map_err(query)?;
            (BridgeResponse::CalcJoinPool(reply), None)
        }
        BridgeRequest::CalcExitPoolCoinsFromShares(q) => {
            let reply = engine
                .calc_exit_pool_coins_from_shares(q.pool_id, q.share_in_amount)
                .map_err(query)?;
            (BridgeResponse::CalcExitPool(reply), None)
        }
        BridgeRequest::CalcJoinPoolShares(q) => {
            let reply = engine.calc_join_pool_shares(q.pool_id, &q.tokens_in).map_err(query)?;
            (BridgeResponse::CalcJoinPool(reply), None)
        }
    };
    Ok(executed)
}
