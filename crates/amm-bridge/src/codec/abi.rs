//! Calldata decoding into [`BridgeRequest`]s and reply encoding.

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_primitives::{Bytes, U256};

use super::{
    opaque,
    record::{Record, AFFILIATE_FIELDS, IBC_INFO_FIELDS, ROUTE_FIELDS},
};
use crate::{
    message::{
        BridgeRequest, BridgeResponse, MsgExitPool, MsgJoinPool, MsgSwapExactAmountIn,
        MsgSwapExactAmountInWithIbcTransfer, QueryCalcExitPool, QueryCalcJoinPool, QueryPool,
    },
    registry::{AbiRegistry, Method, MethodDescriptor},
    types::{Affiliate, Amount, Coin, IbcTransferInfo, Pagination, SwapRoute},
    BridgeError,
};

/// Decodes the arguments of an ABI method, i.e. calldata without the selector.
///
/// JSON methods are not handled here, see [`crate::json`].
pub fn decode_request(
    descriptor: &MethodDescriptor,
    args: &[u8],
) -> Result<BridgeRequest, BridgeError> {
    let method = descriptor.method;
    let values = decode_values(descriptor, args)?;

    let request = match method {
        Method::JoinPool => {
            let args = Record::arguments(&values, &["poolId", "shareOutAmount", "tokenInMaxs"])?;
            BridgeRequest::JoinPool(MsgJoinPool {
                pool_id: args.u64(0)?,
                share_out_amount: args.amount(1)?,
                token_in_maxs: args.coins(2)?,
            })
        }
        Method::ExitPool => {
            let args = Record::arguments(&values, &["poolId", "shareInAmount", "tokenOutMins"])?;
            BridgeRequest::ExitPool(MsgExitPool {
                pool_id: args.u64(0)?,
                share_in_amount: args.amount(1)?,
                token_out_mins: args.coins(2)?,
            })
        }
        Method::SwapExactAmountIn => {
            let args = Record::arguments(
                &values,
                &["routes", "tokenIn", "tokenOutMinAmount", "affiliates"],
            )?;
            BridgeRequest::SwapExactAmountIn(MsgSwapExactAmountIn {
                routes: decode_routes(&args, 0)?,
                token_in: args.coin(1)?,
                token_out_min_amount: args.amount(2)?,
                affiliates: decode_affiliates(&args, 3)?,
            })
        }
        Method::SwapExactAmountInWithIbcTransfer => {
            let args = Record::arguments(
                &values,
                &["routes", "tokenIn", "tokenOutMinAmount", "ibcInfo", "affiliates"],
            )?;
            BridgeRequest::SwapExactAmountInWithIbcTransfer(MsgSwapExactAmountInWithIbcTransfer {
                routes: decode_routes(&args, 0)?,
                token_in: args.coin(1)?,
                token_out_min_amount: args.amount(2)?,
                ibc_info: decode_ibc_info(&args, 3)?,
                affiliates: decode_affiliates(&args, 4)?,
            })
        }
        Method::GetPool => BridgeRequest::GetPool(decode_query_pool(&values)?),
        Method::GetPools => {
            let args = Record::arguments(&values, &["offset", "limit"])?;
            BridgeRequest::GetPools(Pagination { offset: args.u64(0)?, limit: args.u64(1)? })
        }
        Method::GetPoolType => BridgeRequest::GetPoolType(decode_query_pool(&values)?),
        Method::GetPoolParams => BridgeRequest::GetPoolParams(decode_query_pool(&values)?),
        Method::GetTotalShares => BridgeRequest::GetTotalShares(decode_query_pool(&values)?),
        Method::GetTotalLiquidity => {
            Record::arguments(&values, &[])?;
            BridgeRequest::GetTotalLiquidity
        }
        Method::CalcJoinPoolNoSwapShares => {
            BridgeRequest::CalcJoinPoolNoSwapShares(decode_calc_join(&values)?)
        }
        Method::CalcExitPoolCoinsFromShares => {
            let args = Record::arguments(&values, &["poolId", "shareInAmount"])?;
            BridgeRequest::CalcExitPoolCoinsFromShares(QueryCalcExitPool {
                pool_id: args.u64(0)?,
                share_in_amount: args.amount(1)?,
            })
        }
        Method::CalcJoinPoolShares => BridgeRequest::CalcJoinPoolShares(decode_calc_join(&values)?),
        json => {
            return Err(BridgeError::internal("JSON method routed to the ABI decoder")
                .with_detail(json));
        }
    };
    Ok(request)
}

/// Decodes raw argument values with the ABI types of the method.
pub(crate) fn decode_values(
    descriptor: &MethodDescriptor,
    args: &[u8],
) -> Result<Vec<DynSolValue>, BridgeError> {
    descriptor.function.abi_decode_input(args).map_err(|err| {
        BridgeError::invalid_input(format!("failed to decode {} arguments", descriptor.method))
            .with_detail(err)
    })
}

fn decode_query_pool(values: &[DynSolValue]) -> Result<QueryPool, BridgeError> {
    let args = Record::arguments(values, &["poolId"])?;
    Ok(QueryPool { pool_id: args.u64(0)? })
}

fn decode_calc_join(values: &[DynSolValue]) -> Result<QueryCalcJoinPool, BridgeError> {
    let args = Record::arguments(values, &["poolId", "tokensIn"])?;
    Ok(QueryCalcJoinPool { pool_id: args.u64(0)?, tokens_in: args.coins(1)? })
}

fn decode_routes(args: &Record<'_>, index: usize) -> Result<Vec<SwapRoute>, BridgeError> {
    args.array(index)?
        .into_iter()
        .map(|(path, item)| {
            let route = Record::new(item, path, ROUTE_FIELDS)?;
            Ok(SwapRoute { pool_id: route.u64(0)?, token_out_denom: route.string(1)? })
        })
        .collect()
}

fn decode_affiliates(args: &Record<'_>, index: usize) -> Result<Vec<Affiliate>, BridgeError> {
    args.array(index)?
        .into_iter()
        .map(|(path, item)| {
            let affiliate = Record::new(item, path, AFFILIATE_FIELDS)?;
            Ok(Affiliate { address: affiliate.address(0)?, basis_points_fee: affiliate.amount(1)? })
        })
        .collect()
}

fn decode_ibc_info(args: &Record<'_>, index: usize) -> Result<IbcTransferInfo, BridgeError> {
    let info = args.record(index, IBC_INFO_FIELDS)?;
    Ok(IbcTransferInfo {
        source_channel: info.string(0)?,
        receiver: info.string(1)?,
        memo: info.string(2)?,
        timeout_timestamp: info.u64(3)?,
    })
}

fn uint64(value: u64) -> DynSolValue {
    DynSolValue::Uint(U256::from(value), 64)
}

fn amount(value: Amount) -> DynSolValue {
    DynSolValue::Uint(value.get(), 256)
}

fn coin(coin: &Coin) -> DynSolValue {
    DynSolValue::Tuple(vec![DynSolValue::String(coin.denom.clone()), amount(coin.amount)])
}

fn coins(coins: &[Coin]) -> DynSolValue {
    DynSolValue::Array(coins.iter().map(coin).collect())
}

fn routes(routes: &[SwapRoute]) -> DynSolValue {
    DynSolValue::Array(
        routes
            .iter()
            .map(|route| {
                DynSolValue::Tuple(vec![
                    uint64(route.pool_id),
                    DynSolValue::String(route.token_out_denom.clone()),
                ])
            })
            .collect(),
    )
}

fn affiliates(affiliates: &[Affiliate]) -> DynSolValue {
    DynSolValue::Array(
        affiliates
            .iter()
            .map(|affiliate| {
                DynSolValue::Tuple(vec![
                    DynSolValue::Address(affiliate.address),
                    amount(affiliate.basis_points_fee),
                ])
            })
            .collect(),
    )
}

fn ibc_info(info: &IbcTransferInfo) -> DynSolValue {
    DynSolValue::Tuple(vec![
        DynSolValue::String(info.source_channel.clone()),
        DynSolValue::String(info.receiver.clone()),
        DynSolValue::String(info.memo.clone()),
        uint64(info.timeout_timestamp),
    ])
}

/// Encodes the arguments of a request in the ABI layout of its method.
pub fn encode_arguments(request: &BridgeRequest) -> Vec<DynSolValue> {
    match request {
        BridgeRequest::JoinPool(msg) => {
            vec![uint64(msg.pool_id), amount(msg.share_out_amount), coins(&msg.token_in_maxs)]
        }
        BridgeRequest::ExitPool(msg) => {
            vec![uint64(msg.pool_id), amount(msg.share_in_amount), coins(&msg.token_out_mins)]
        }
        BridgeRequest::SwapExactAmountIn(msg) => vec![
            routes(&msg.routes),
            coin(&msg.token_in),
            amount(msg.token_out_min_amount),
            affiliates(&msg.affiliates),
        ],
        BridgeRequest::SwapExactAmountInWithIbcTransfer(msg) => vec![
            routes(&msg.routes),
            coin(&msg.token_in),
            amount(msg.token_out_min_amount),
            ibc_info(&msg.ibc_info),
            affiliates(&msg.affiliates),
        ],
        BridgeRequest::GetPool(query) |
        BridgeRequest::GetPoolType(query) |
        BridgeRequest::GetPoolParams(query) |
        BridgeRequest::GetTotalShares(query) => vec![uint64(query.pool_id)],
        BridgeRequest::GetPools(page) => vec![uint64(page.offset), uint64(page.limit)],
        BridgeRequest::GetTotalLiquidity => Vec::new(),
        BridgeRequest::CalcJoinPoolNoSwapShares(query) |
        BridgeRequest::CalcJoinPoolShares(query) => {
            vec![uint64(query.pool_id), coins(&query.tokens_in)]
        }
        BridgeRequest::CalcExitPoolCoinsFromShares(query) => {
            vec![uint64(query.pool_id), amount(query.share_in_amount)]
        }
    }
}

/// Encodes a request as calldata of its ABI method, selector included.
pub fn encode_request(registry: &AbiRegistry, request: &BridgeRequest) -> Bytes {
    let selector = registry.descriptor(request.method()).selector();
    let mut calldata = selector.to_vec();
    calldata.extend(DynSolValue::Tuple(encode_arguments(request)).abi_encode_params());
    calldata.into()
}

/// Encodes a reply in the ABI output layout of its method.
pub fn encode_response(response: &BridgeResponse) -> Bytes {
    let outputs = match response {
        BridgeResponse::JoinPool(reply) => {
            vec![amount(reply.share_out_amount), coins(&reply.token_in)]
        }
        BridgeResponse::ExitPool(reply) => vec![coins(&reply.token_out)],
        BridgeResponse::Swap(reply) => vec![amount(reply.token_out_amount)],
        BridgeResponse::Pool(pool) => vec![DynSolValue::Bytes(opaque::encode_pool(pool).to_vec())],
        BridgeResponse::Pools(pools) => {
            vec![DynSolValue::Bytes(opaque::encode_pools(pools).to_vec())]
        }
        BridgeResponse::PoolType(pool_type) => vec![DynSolValue::String(pool_type.clone())],
        BridgeResponse::PoolParams(params) => {
            vec![DynSolValue::Bytes(opaque::encode_pool_params(params).to_vec())]
        }
        BridgeResponse::TotalShares(shares) => vec![coin(shares)],
        BridgeResponse::TotalLiquidity(liquidity) => vec![coins(liquidity)],
        BridgeResponse::CalcJoinPool(reply) => {
            vec![amount(reply.share_out_amount), coins(&reply.tokens_out)]
        }
        BridgeResponse::CalcExitPool(tokens_out) => vec![coins(tokens_out)],
    };
    DynSolValue::Tuple(outputs).abi_encode_params().into()
}
