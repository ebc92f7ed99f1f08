//! Structural and semantic validation of decoded requests.
//!
//! Every request is validated before the engine is contacted. Failures are
//! [`ErrorCode::InvalidInput`](crate::ErrorCode::InvalidInput) errors naming the offending field by
//! its position, e.g. `tokenInMaxs[1].amount must be positive`.

use alloy_primitives::map::HashSet;

use crate::{
    constants::bounds::{
        MAX_AFFILIATES, MAX_BASIS_POINTS, MAX_COINS, MAX_MEMO_LENGTH, MAX_PAGINATION_LIMIT,
        MAX_ROUTES, MAX_STRING_LENGTH,
    },
    message::BridgeRequest,
    types::{Affiliate, Amount, Coin, IbcTransferInfo, Pagination, SwapRoute},
    BridgeError,
};

fn invalid(field: &str, rule: impl core::fmt::Display) -> BridgeError {
    BridgeError::invalid_input(format!("{field} {rule}"))
}

/// Rejects the zero pool id.
pub fn validate_pool_id(pool_id: u64, field: &str) -> Result<(), BridgeError> {
    if pool_id == 0 {
        return Err(invalid(field, "cannot be zero"));
    }
    Ok(())
}

/// Requires a positive amount, or a non-negative one when `allow_zero` is set. The upper bound
/// is guaranteed by [`Amount`] itself.
pub fn validate_amount(amount: Amount, field: &str, allow_zero: bool) -> Result<(), BridgeError> {
    if amount.is_zero() && !allow_zero {
        return Err(invalid(field, "must be positive"));
    }
    Ok(())
}

/// Requires a non-empty string within the generic length bound.
pub fn validate_string(value: &str, field: &str) -> Result<(), BridgeError> {
    if value.is_empty() {
        return Err(invalid(field, "cannot be empty"));
    }
    if value.len() > MAX_STRING_LENGTH {
        return Err(invalid(field, format_args!("exceeds maximum length of {MAX_STRING_LENGTH} bytes")));
    }
    Ok(())
}

/// Validates a single coin.
pub fn validate_coin(coin: &Coin, field: &str, allow_zero: bool) -> Result<(), BridgeError> {
    validate_string(&coin.denom, &format!("{field}.denom"))?;
    validate_amount(coin.amount, &format!("{field}.amount"), allow_zero)
}

/// Validates a coin list.
///
/// In the allow-zero form, used for optional minimums, the list may be empty and amounts may be
/// zero. Denominations must be unique in both forms.
pub fn validate_coins(coins: &[Coin], field: &str, allow_zero: bool) -> Result<(), BridgeError> {
    if coins.is_empty() && !allow_zero {
        return Err(invalid(field, "cannot be empty"));
    }
    if coins.len() > MAX_COINS {
        return Err(invalid(field, format_args!("exceeds maximum of {MAX_COINS} coins")));
    }
    let mut seen: HashSet<&str> = HashSet::default();
    for (i, coin) in coins.iter().enumerate() {
        let position = format!("{field}[{i}]");
        validate_coin(coin, &position, allow_zero)?;
        if !seen.insert(coin.denom.as_str()) {
            return Err(invalid(&format!("{position}.denom"), format_args!("duplicates {}", coin.denom)));
        }
    }
    Ok(())
}

/// Validates swap routes: between 1 and [`MAX_ROUTES`] hops, each with a pool and a denom.
pub fn validate_routes(routes: &[SwapRoute]) -> Result<(), BridgeError> {
    if routes.is_empty() {
        return Err(invalid("routes", "cannot be empty"));
    }
    if routes.len() > MAX_ROUTES {
        return Err(invalid("routes", format_args!("exceeds maximum of {MAX_ROUTES} hops")));
    }
    for (i, route) in routes.iter().enumerate() {
        validate_pool_id(route.pool_id, &format!("routes[{i}].poolId"))?;
        validate_string(&route.token_out_denom, &format!("routes[{i}].tokenOutDenom"))?;
    }
    Ok(())
}

/// Validates affiliates. An empty list is allowed.
pub fn validate_affiliates(affiliates: &[Affiliate]) -> Result<(), BridgeError> {
    if affiliates.len() > MAX_AFFILIATES {
        return Err(invalid(
            "affiliates",
            format_args!("exceeds maximum of {MAX_AFFILIATES} entries"),
        ));
    }
    for (i, affiliate) in affiliates.iter().enumerate() {
        if affiliate.address.is_zero() {
            return Err(invalid(&format!("affiliates[{i}].address"), "cannot be zero"));
        }
        if affiliate.basis_points_fee > Amount::from_u64(MAX_BASIS_POINTS) {
            return Err(invalid(
                &format!("affiliates[{i}].basisPointsFee"),
                format_args!("exceeds maximum of {MAX_BASIS_POINTS}"),
            ));
        }
    }
    Ok(())
}

/// Validates an IBC transfer. The timeout must be strictly after `now`.
pub fn validate_ibc_transfer_info(info: &IbcTransferInfo, now: u64) -> Result<(), BridgeError> {
    validate_string(&info.source_channel, "ibcInfo.sourceChannel")?;
    validate_string(&info.receiver, "ibcInfo.receiver")?;
    if info.memo.len() > MAX_MEMO_LENGTH {
        return Err(invalid(
            "ibcInfo.memo",
            format_args!("exceeds maximum length of {MAX_MEMO_LENGTH} bytes"),
        ));
    }
    if info.timeout_timestamp <= now {
        return Err(invalid("ibcInfo.timeoutTimestamp", "must be in the future")
            .with_detail(format_args!("timeout {} <= block time {now}", info.timeout_timestamp)));
    }
    Ok(())
}

/// Validates a page: `0 < limit <= MAX_PAGINATION_LIMIT`.
pub fn validate_pagination(pagination: &Pagination) -> Result<(), BridgeError> {
    if pagination.limit == 0 {
        return Err(invalid("limit", "cannot be zero"));
    }
    if pagination.limit > MAX_PAGINATION_LIMIT {
        return Err(invalid("limit", format_args!("exceeds maximum of {MAX_PAGINATION_LIMIT}")));
    }
    Ok(())
}

impl BridgeRequest {
    /// Validates the request against the block timestamp `now`.
    pub fn validate(&self, now: u64) -> Result<(), BridgeError> {
        match self {
            Self::JoinPool(msg) => {
                validate_pool_id(msg.pool_id, "poolId")?;
                validate_amount(msg.share_out_amount, "shareOutAmount", false)?;
                validate_coins(&msg.token_in_maxs, "tokenInMaxs", false)
            }
            Self::ExitPool(msg) => {
                validate_pool_id(msg.pool_id, "poolId")?;
                validate_amount(msg.share_in_amount, "shareInAmount", false)?;
                validate_coins(&msg.token_out_mins, "tokenOutMins", true)
            }
            Self::SwapExactAmountIn(msg) => {
                validate_routes(&msg.routes)?;
                validate_coin(&msg.token_in, "tokenIn", false)?;
                validate_amount(msg.token_out_min_amount, "tokenOutMinAmount", false)?;
                validate_affiliates(&msg.affiliates)
            }
            Self::SwapExactAmountInWithIbcTransfer(msg) => {
                validate_routes(&msg.routes)?;
                validate_coin(&msg.token_in, "tokenIn", false)?;
                validate_amount(msg.token_out_min_amount, "tokenOutMinAmount", false)?;
                validate_ibc_transfer_info(&msg.ibc_info, now)?;
                validate_affiliates(&msg.affiliates)
            }
            Self::GetPool(query) |
            Self::GetPoolType(query) |
            Self::GetPoolParams(query) |
            Self::GetTotalShares(query) => validate_pool_id(query.pool_id, "poolId"),
            Self::GetPools(pagination) => validate_pagination(pagination),
            Self::GetTotalLiquidity => Ok(()),
            Self::CalcJoinPoolNoSwapShares(query) | Self::CalcJoinPoolShares(query) => {
                validate_pool_id(query.pool_id, "poolId")?;
                validate_coins(&query.tokens_in, "tokensIn", false)
            }
            Self::CalcExitPoolCoinsFromShares(query) => {
                validate_pool_id(query.pool_id, "poolId")?;
                validate_amount(query.share_in_amount, "shareInAmount", false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        message::{MsgExitPool, MsgJoinPool, MsgSwapExactAmountIn, QueryPool},
        ErrorCode,
    };
    use alloy_primitives::{address, Address};
    use rstest::rstest;

    fn coins(entries: &[(&str, u64)]) -> Vec<Coin> {
        entries.iter().map(|(denom, amount)| Coin::new(*denom, *amount)).collect()
    }

    fn route(pool_id: u64, denom: &str) -> SwapRoute {
        SwapRoute { pool_id, token_out_denom: denom.into() }
    }

    fn ibc(timeout_timestamp: u64, memo_len: usize) -> IbcTransferInfo {
        IbcTransferInfo {
            source_channel: "channel-0".into(),
            receiver: "cosmos1receiver".into(),
            memo: "m".repeat(memo_len),
            timeout_timestamp,
        }
    }

    fn assert_rejected(result: Result<(), BridgeError>, needle: &str) {
        let err = result.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert!(err.message().contains(needle), "{:?} does not contain {needle:?}", err.message());
    }

    #[test]
    fn test_zero_pool_id() {
        assert_rejected(validate_pool_id(0, "poolId"), "poolId cannot be zero");
        assert!(validate_pool_id(1, "poolId").is_ok());
    }

    #[rstest]
    #[case::empty(&[], false, Some("tokenInMaxs cannot be empty"))]
    #[case::empty_allowed(&[], true, None)]
    #[case::zero_amount(&[("uatom", 0)], false, Some("tokenInMaxs[0].amount must be positive"))]
    #[case::zero_allowed(&[("uatom", 0), ("uosmo", 0)], true, None)]
    #[case::empty_denom(&[("uatom", 1), ("", 1)], false, Some("tokenInMaxs[1].denom cannot be empty"))]
    #[case::duplicate(&[("uatom", 1), ("uatom", 2)], true, Some("tokenInMaxs[1].denom duplicates uatom"))]
    #[case::valid(&[("uatom", 1), ("uosmo", 2)], false, None)]
    fn test_coins(
        #[case] entries: &[(&str, u64)],
        #[case] allow_zero: bool,
        #[case] expected: Option<&str>,
    ) {
        let result = validate_coins(&coins(entries), "tokenInMaxs", allow_zero);
        match expected {
            Some(needle) => assert_rejected(result, needle),
            None => assert!(result.is_ok()),
        }
    }

    #[test]
    fn test_coin_list_bound() {
        let many: Vec<_> = (0..=MAX_COINS).map(|i| Coin::new(format!("denom{i}"), 1u64)).collect();
        assert_rejected(validate_coins(&many, "tokensIn", false), "exceeds maximum of 20 coins");
        assert!(validate_coins(&many[..MAX_COINS], "tokensIn", false).is_ok());
    }

    #[test]
    fn test_denom_length_bound() {
        let coin = Coin::new("d".repeat(MAX_STRING_LENGTH + 1), 1u64);
        assert_rejected(validate_coin(&coin, "tokenIn", false), "tokenIn.denom exceeds maximum length");
        let coin = Coin::new("d".repeat(MAX_STRING_LENGTH), 1u64);
        assert!(validate_coin(&coin, "tokenIn", false).is_ok());
    }

    #[rstest]
    #[case::empty(0, Some("routes cannot be empty"))]
    #[case::one(1, None)]
    #[case::max(MAX_ROUTES, None)]
    #[case::too_many(MAX_ROUTES + 1, Some("routes exceeds maximum of 10 hops"))]
    fn test_route_count(#[case] hops: usize, #[case] expected: Option<&str>) {
        let routes: Vec<_> = (1..=hops as u64).map(|id| route(id, "uosmo")).collect();
        match expected {
            Some(needle) => assert_rejected(validate_routes(&routes), needle),
            None => assert!(validate_routes(&routes).is_ok()),
        }
    }

    #[test]
    fn test_route_fields() {
        assert_rejected(
            validate_routes(&[route(1, "uosmo"), route(0, "uatom")]),
            "routes[1].poolId cannot be zero",
        );
        assert_rejected(validate_routes(&[route(1, "")]), "routes[0].tokenOutDenom cannot be empty");
    }

    #[rstest]
    #[case::zero_fee(address!("0x2222222222222222222222222222222222222222"), 0, None)]
    #[case::full_fee(address!("0x2222222222222222222222222222222222222222"), 10_000, None)]
    #[case::over_fee(
        address!("0x2222222222222222222222222222222222222222"),
        10_001,
        Some("affiliates[0].basisPointsFee exceeds maximum of 10000")
    )]
    #[case::zero_address(Address::ZERO, 1, Some("affiliates[0].address cannot be zero"))]
    fn test_affiliates(#[case] address: Address, #[case] fee: u64, #[case] expected: Option<&str>) {
        let affiliates = [Affiliate { address, basis_points_fee: fee.into() }];
        match expected {
            Some(needle) => assert_rejected(validate_affiliates(&affiliates), needle),
            None => assert!(validate_affiliates(&affiliates).is_ok()),
        }
        assert!(validate_affiliates(&[]).is_ok());
    }

    #[test]
    fn test_affiliate_count_bound() {
        let affiliate = Affiliate {
            address: address!("0x2222222222222222222222222222222222222222"),
            basis_points_fee: 1u64.into(),
        };
        let affiliates = vec![affiliate; MAX_AFFILIATES + 1];
        assert_rejected(validate_affiliates(&affiliates), "affiliates exceeds maximum of 10 entries");
    }

    #[rstest]
    #[case::future(1_001, true)]
    #[case::now(1_000, false)]
    #[case::past(999, false)]
    fn test_ibc_timeout_is_strictly_future(#[case] timeout: u64, #[case] accepted: bool) {
        let result = validate_ibc_transfer_info(&ibc(timeout, 0), 1_000);
        if accepted {
            assert!(result.is_ok());
        } else {
            assert_rejected(result, "ibcInfo.timeoutTimestamp must be in the future");
        }
    }

    #[test]
    fn test_ibc_memo_and_required_fields() {
        assert!(validate_ibc_transfer_info(&ibc(2_000, MAX_MEMO_LENGTH), 1_000).is_ok());
        assert_rejected(
            validate_ibc_transfer_info(&ibc(2_000, MAX_MEMO_LENGTH + 1), 1_000),
            "ibcInfo.memo exceeds maximum length of 256 bytes",
        );
        let mut info = ibc(2_000, 0);
        info.receiver.clear();
        assert_rejected(validate_ibc_transfer_info(&info, 1_000), "ibcInfo.receiver cannot be empty");
    }

    #[rstest]
    #[case::zero(0, Some("limit cannot be zero"))]
    #[case::one(1, None)]
    #[case::max(MAX_PAGINATION_LIMIT, None)]
    #[case::over(MAX_PAGINATION_LIMIT + 1, Some("limit exceeds maximum of 1000"))]
    fn test_pagination(#[case] limit: u64, #[case] expected: Option<&str>) {
        let page = Pagination { offset: 5, limit };
        match expected {
            Some(needle) => assert_rejected(validate_pagination(&page), needle),
            None => assert!(validate_pagination(&page).is_ok()),
        }
    }

    #[test]
    fn test_join_requires_max_coins_but_exit_accepts_empty_mins() {
        let join = BridgeRequest::JoinPool(MsgJoinPool {
            pool_id: 1,
            share_out_amount: 10u64.into(),
            token_in_maxs: Vec::new(),
        });
        assert_rejected(join.validate(0), "tokenInMaxs cannot be empty");

        let exit = BridgeRequest::ExitPool(MsgExitPool {
            pool_id: 1,
            share_in_amount: 10u64.into(),
            token_out_mins: Vec::new(),
        });
        assert!(exit.validate(0).is_ok());
    }

    #[test]
    fn test_request_amounts_must_be_positive() {
        let swap = BridgeRequest::SwapExactAmountIn(MsgSwapExactAmountIn {
            routes: vec![route(1, "uosmo")],
            token_in: Coin::new("uatom", 0u64),
            token_out_min_amount: 1u64.into(),
            affiliates: Vec::new(),
        });
        assert_rejected(swap.validate(0), "tokenIn.amount must be positive");

        let query = BridgeRequest::GetPoolType(QueryPool { pool_id: 0 });
        assert_rejected(query.validate(0), "poolId cannot be zero");
    }
}
