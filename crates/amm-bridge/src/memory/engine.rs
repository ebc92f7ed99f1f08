use core::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use alloy_primitives::{Address, U256};

use crate::{
    engine::{AmmEngine, EngineError},
    message::{
        CalcJoinPoolResponse, ExitPoolResponse, JoinPoolResponse, MsgExitPool, MsgJoinPool,
        MsgSwapExactAmountIn, MsgSwapExactAmountInWithIbcTransfer, SwapResponse,
    },
    registry::Method,
    types::{Affiliate, Amount, Coin, Pagination, PoolAsset, PoolInfo, PoolParams, Sender, SwapRoute},
};

/// Fixed-point scale of pool fees.
pub const FEE_SCALE: u64 = 1_000_000_000_000_000_000;

/// Reserve of each asset of the default pools.
pub const DEFAULT_RESERVE: u64 = 1_000_000_000_000;

/// Outstanding shares of the default pools.
pub const DEFAULT_SHARES: u64 = 1_000_000_000_000_000_000;

/// Swap fee of the default pools, 0.3%.
pub const DEFAULT_SWAP_FEE: u64 = 3_000_000_000_000_000;

/// An engine call observed by [`MemoryEngine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineCall {
    /// Operation invoked.
    pub method: Method,
    /// Bech32 sender handed over with a transaction, `None` for queries.
    pub sender: Option<String>,
}

/// An IBC transfer recorded by [`MemoryEngine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IbcTransfer {
    /// Bech32 sender of the swap.
    pub sender: String,
    /// Channel the transfer left through.
    pub source_channel: String,
    /// Counterparty receiver.
    pub receiver: String,
    /// Tokens sent.
    pub token: Coin,
}

/// A two-asset pool with equal weights.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryPool {
    /// Reserves, in pool order.
    pub reserves: Vec<Coin>,
    /// Outstanding shares.
    pub total_shares: Amount,
    /// Fee parameters, scaled by [`FEE_SCALE`].
    pub params: PoolParams,
}

impl MemoryPool {
    /// Creates a pool holding `reserves` with [`DEFAULT_SHARES`] outstanding.
    pub fn new(reserves: Vec<Coin>) -> Self {
        Self {
            reserves,
            total_shares: Amount::from_u64(DEFAULT_SHARES),
            params: PoolParams { swap_fee: Amount::from_u64(DEFAULT_SWAP_FEE), exit_fee: Amount::ZERO },
        }
    }

    fn reserve(&self, denom: &str) -> Result<usize, EngineError> {
        self.reserves
            .iter()
            .position(|coin| coin.denom == denom)
            .ok_or_else(|| EngineError::DenomNotFound(denom.to_string()))
    }
}

/// An in-memory balancer-style engine, used for simulation and tests.
///
/// It keeps per-sender balances keyed by bech32 address, runs constant-product swaps and
/// proportional joins and exits, and records every call it receives.
#[derive(Debug)]
pub struct MemoryEngine {
    pools: BTreeMap<u64, MemoryPool>,
    balances: HashMap<(String, String), Amount>,
    ibc_transfers: Vec<IbcTransfer>,
    affiliate_fees: Vec<(Address, Coin)>,
    calls: RefCell<Vec<EngineCall>>,
    next_error: RefCell<Option<EngineError>>,
}

impl Default for MemoryEngine {
    /// Pool 1 holds `uatom`/`uosmo`, pool 2 holds `uosmo`/`uion`.
    fn default() -> Self {
        Self::empty()
            .with_pool(
                1,
                MemoryPool::new(vec![
                    Coin::new("uatom", DEFAULT_RESERVE),
                    Coin::new("uosmo", DEFAULT_RESERVE),
                ]),
            )
            .with_pool(
                2,
                MemoryPool::new(vec![
                    Coin::new("uosmo", DEFAULT_RESERVE),
                    Coin::new("uion", DEFAULT_RESERVE),
                ]),
            )
    }
}

impl MemoryEngine {
    /// Creates an engine without pools.
    pub fn empty() -> Self {
        Self {
            pools: BTreeMap::new(),
            balances: HashMap::new(),
            ibc_transfers: Vec::new(),
            affiliate_fees: Vec::new(),
            calls: RefCell::new(Vec::new()),
            next_error: RefCell::new(None),
        }
    }

    /// Inserts a pool.
    pub fn set_pool(&mut self, pool_id: u64, pool: MemoryPool) {
        self.pools.insert(pool_id, pool);
    }

    /// Inserts a pool.
    pub fn with_pool(mut self, pool_id: u64, pool: MemoryPool) -> Self {
        self.set_pool(pool_id, pool);
        self
    }

    /// Credits coins to an account.
    pub fn fund(&mut self, owner: &str, coins: &[Coin]) {
        for coin in coins {
            self.credit(owner, &coin.denom, coin.amount);
        }
    }

    /// Credits coins to an account.
    pub fn funded(mut self, owner: &str, coins: &[Coin]) -> Self {
        self.fund(owner, coins);
        self
    }

    /// Makes the next engine call fail with `err`.
    pub fn fail_next(&self, err: EngineError) {
        *self.next_error.borrow_mut() = Some(err);
    }

    /// Returns the balance of an account.
    pub fn balance(&self, owner: &str, denom: &str) -> Amount {
        self.balances.get(&(owner.to_string(), denom.to_string())).copied().unwrap_or_default()
    }

    /// Returns a pool.
    pub fn memory_pool(&self, pool_id: u64) -> Option<&MemoryPool> {
        self.pools.get(&pool_id)
    }

    /// Returns every call received so far.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.borrow().clone()
    }

    /// Returns every IBC transfer sent so far.
    pub fn ibc_transfers(&self) -> &[IbcTransfer] {
        &self.ibc_transfers
    }

    /// Returns every affiliate fee paid so far.
    pub fn affiliate_fees(&self) -> &[(Address, Coin)] {
        &self.affiliate_fees
    }

    fn record(&self, method: Method, sender: Option<&Sender>) -> Result<(), EngineError> {
        self.calls
            .borrow_mut()
            .push(EngineCall { method, sender: sender.map(|sender| sender.bech32().to_string()) });
        self.next_error.borrow_mut().take().map_or(Ok(()), Err)
    }

    fn get(&self, pool_id: u64) -> Result<&MemoryPool, EngineError> {
        self.pools.get(&pool_id).ok_or(EngineError::PoolNotFound(pool_id))
    }

    fn get_mut(&mut self, pool_id: u64) -> Result<&mut MemoryPool, EngineError> {
        self.pools.get_mut(&pool_id).ok_or(EngineError::PoolNotFound(pool_id))
    }

    fn credit(&mut self, owner: &str, denom: &str, amount: Amount) {
        let balance = self.balances.entry((owner.to_string(), denom.to_string())).or_default();
        *balance = balance.checked_add(amount).unwrap_or(Amount::MAX);
    }

    fn debit(&mut self, owner: &str, denom: &str, amount: Amount) -> Result<(), EngineError> {
        let key = (owner.to_string(), denom.to_string());
        let balance = self.balances.get(&key).copied().unwrap_or_default();
        let remaining = balance.checked_sub(amount).ok_or_else(|| {
            EngineError::InsufficientFunds(format!("{owner} has {balance}{denom}, needs {amount}{denom}"))
        })?;
        self.balances.insert(key, remaining);
        Ok(())
    }

    /// Runs a swap through every hop, updating reserves. Returns the output of the last hop.
    fn route(&mut self, routes: &[SwapRoute], token_in: &Coin) -> Result<Coin, EngineError> {
        let mut current = token_in.clone();
        for route in routes {
            let pool = self.get_mut(route.pool_id)?;
            let i = pool.reserve(&current.denom)?;
            let o = pool.reserve(&route.token_out_denom)?;
            if i == o {
                return Err(EngineError::InvalidArgument(format!(
                    "pool {} cannot swap {} for itself",
                    route.pool_id, current.denom
                )));
            }
            let fee = pool.params.swap_fee.get();
            let scale = U256::from(FEE_SCALE);
            let effective = current.amount.get() * (scale - fee) / scale;
            let reserve_in = pool.reserves[i].amount.get();
            let reserve_out = pool.reserves[o].amount.get();
            let out = reserve_out * effective / (reserve_in + effective);
            if out.is_zero() {
                return Err(EngineError::InvalidArgument("swap output rounds to zero".into()));
            }
            pool.reserves[i].amount = amount(reserve_in + current.amount.get())?;
            pool.reserves[o].amount = amount(reserve_out - out)?;
            current = Coin { denom: route.token_out_denom.clone(), amount: amount(out)? };
        }
        Ok(current)
    }

    fn take_affiliate_fees(
        &mut self,
        affiliates: &[Affiliate],
        output: &mut Coin,
    ) -> Result<(), EngineError> {
        let gross = output.amount.get();
        let mut paid = U256::ZERO;
        for affiliate in affiliates {
            let fee = gross * affiliate.basis_points_fee.get() / U256::from(10_000u64);
            paid += fee;
            self.affiliate_fees
                .push((affiliate.address, Coin { denom: output.denom.clone(), amount: amount(fee)? }));
        }
        let net = gross.checked_sub(paid).ok_or_else(|| {
            EngineError::InvalidArgument("affiliate fees exceed the swap output".into())
        })?;
        output.amount = amount(net)?;
        Ok(())
    }

    fn swap(
        &mut self,
        sender: &Sender,
        routes: &[SwapRoute],
        token_in: &Coin,
        min_out: Amount,
        affiliates: &[Affiliate],
    ) -> Result<Coin, EngineError> {
        self.debit(sender.bech32(), &token_in.denom, token_in.amount)?;
        let mut output = self.route(routes, token_in)?;
        self.take_affiliate_fees(affiliates, &mut output)?;
        if output.amount < min_out {
            return Err(EngineError::SlippageExceeded(format!(
                "output {} below minimum {min_out}",
                output.amount
            )));
        }
        Ok(output)
    }

    fn share_denom(pool_id: u64) -> String {
        format!("gamm/pool/{pool_id}")
    }

    fn no_swap_shares(pool: &MemoryPool, tokens_in: &[Coin]) -> Result<CalcJoinPoolResponse, EngineError> {
        let total = pool.total_shares.get();
        let mut shares: Option<U256> = None;
        for reserve in &pool.reserves {
            let offered = tokens_in
                .iter()
                .find(|coin| coin.denom == reserve.denom)
                .ok_or_else(|| EngineError::InvalidArgument(format!("missing {}", reserve.denom)))?;
            let candidate = offered.amount.get() * total / reserve.amount.get();
            shares = Some(shares.map_or(candidate, |current| current.min(candidate)));
        }
        let shares = shares.unwrap_or_default();
        Ok(CalcJoinPoolResponse {
            share_out_amount: amount(shares)?,
            tokens_out: proportional(pool, shares, Rounding::Up)?,
        })
    }
}

#[derive(Clone, Copy)]
enum Rounding {
    Up,
    Down,
}

fn amount(value: U256) -> Result<Amount, EngineError> {
    Amount::new(value).map_err(|err| EngineError::Other(err.to_string()))
}

/// `reserve · shares / total` for every reserve of the pool.
fn proportional(pool: &MemoryPool, shares: U256, rounding: Rounding) -> Result<Vec<Coin>, EngineError> {
    let total = pool.total_shares.get();
    pool.reserves
        .iter()
        .map(|reserve| {
            let product = reserve.amount.get() * shares;
            let value = match rounding {
                Rounding::Down => product / total,
                Rounding::Up => product.div_ceil(total),
            };
            Ok(Coin { denom: reserve.denom.clone(), amount: amount(value)? })
        })
        .collect()
}

impl AmmEngine for MemoryEngine {
    fn join_pool(
        &mut self,
        sender: &Sender,
        msg: &MsgJoinPool,
    ) -> Result<JoinPoolResponse, EngineError> {
        self.record(Method::JoinPool, Some(sender))?;
        let pool = self.get(msg.pool_id)?;
        for max in &msg.token_in_maxs {
            pool.reserve(&max.denom)?;
        }
        let token_in = proportional(pool, msg.share_out_amount.get(), Rounding::Up)?;
        for needed in &token_in {
            let max = msg
                .token_in_maxs
                .iter()
                .find(|max| max.denom == needed.denom)
                .map_or(Amount::ZERO, |max| max.amount);
            if needed.amount > max {
                return Err(EngineError::SlippageExceeded(format!(
                    "{needed} exceeds maximum {max}{}",
                    needed.denom
                )));
            }
        }

        for coin in &token_in {
            self.debit(sender.bech32(), &coin.denom, coin.amount)?;
        }
        let pool = self.get_mut(msg.pool_id)?;
        for (reserve, coin) in pool.reserves.iter_mut().zip(&token_in) {
            reserve.amount = amount(reserve.amount.get() + coin.amount.get())?;
        }
        pool.total_shares = amount(pool.total_shares.get() + msg.share_out_amount.get())?;
        self.credit(sender.bech32(), &Self::share_denom(msg.pool_id), msg.share_out_amount);

        Ok(JoinPoolResponse { share_out_amount: msg.share_out_amount, token_in })
    }

    fn exit_pool(
        &mut self,
        sender: &Sender,
        msg: &MsgExitPool,
    ) -> Result<ExitPoolResponse, EngineError> {
        self.record(Method::ExitPool, Some(sender))?;
        let pool = self.get(msg.pool_id)?;
        if msg.share_in_amount > pool.total_shares {
            return Err(EngineError::InvalidArgument("share in exceeds total shares".into()));
        }
        let token_out: Vec<Coin> = proportional(pool, msg.share_in_amount.get(), Rounding::Down)?
            .into_iter()
            .filter(|coin| !coin.amount.is_zero())
            .collect();
        for min in &msg.token_out_mins {
            let paid =
                token_out.iter().find(|coin| coin.denom == min.denom).map_or(Amount::ZERO, |c| c.amount);
            if paid < min.amount {
                return Err(EngineError::SlippageExceeded(format!(
                    "{paid}{} below minimum {min}",
                    min.denom
                )));
            }
        }

        self.debit(sender.bech32(), &Self::share_denom(msg.pool_id), msg.share_in_amount)?;
        let pool = self.get_mut(msg.pool_id)?;
        for coin in &token_out {
            if let Some(reserve) = pool.reserves.iter_mut().find(|r| r.denom == coin.denom) {
                reserve.amount = amount(reserve.amount.get() - coin.amount.get())?;
            }
        }
        pool.total_shares = amount(pool.total_shares.get() - msg.share_in_amount.get())?;
        for coin in &token_out {
            self.credit(sender.bech32(), &coin.denom, coin.amount);
        }

        Ok(ExitPoolResponse { token_out })
    }

    fn swap_exact_amount_in(
        &mut self,
        sender: &Sender,
        msg: &MsgSwapExactAmountIn,
    ) -> Result<SwapResponse, EngineError> {
        self.record(Method::SwapExactAmountIn, Some(sender))?;
        let output = self.swap(
            sender,
            &msg.routes,
            &msg.token_in,
            msg.token_out_min_amount,
            &msg.affiliates,
        )?;
        self.credit(sender.bech32(), &output.denom, output.amount);
        Ok(SwapResponse { token_out_amount: output.amount })
    }

    fn swap_exact_amount_in_with_ibc_transfer(
        &mut self,
        sender: &Sender,
        msg: &MsgSwapExactAmountInWithIbcTransfer,
    ) -> Result<SwapResponse, EngineError> {
        self.record(Method::SwapExactAmountInWithIbcTransfer, Some(sender))?;
        if !msg.ibc_info.source_channel.starts_with("channel-") {
            return Err(EngineError::IbcTransfer(format!(
                "unknown channel {}",
                msg.ibc_info.source_channel
            )));
        }
        let output = self.swap(
            sender,
            &msg.routes,
            &msg.token_in,
            msg.token_out_min_amount,
            &msg.affiliates,
        )?;
        let token_out_amount = output.amount;
        self.ibc_transfers.push(IbcTransfer {
            sender: sender.bech32().to_string(),
            source_channel: msg.ibc_info.source_channel.clone(),
            receiver: msg.ibc_info.receiver.clone(),
            token: output,
        });
        Ok(SwapResponse { token_out_amount })
    }

    fn pool(&self, pool_id: u64) -> Result<PoolInfo, EngineError> {
        self.record(Method::GetPool, None)?;
        let pool = self.get(pool_id)?;
        Ok(PoolInfo {
            id: pool_id,
            pool_type: "balancer".into(),
            total_shares: Coin { denom: Self::share_denom(pool_id), amount: pool.total_shares },
            assets: pool
                .reserves
                .iter()
                .map(|token| PoolAsset { token: token.clone(), weight: Amount::from_u64(1) })
                .collect(),
            params: pool.params,
        })
    }

    fn pools(&self, pagination: &Pagination) -> Result<Vec<PoolInfo>, EngineError> {
        let ids: Vec<u64> = self
            .pools
            .keys()
            .copied()
            .skip(usize::try_from(pagination.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(pagination.limit).unwrap_or(usize::MAX))
            .collect();
        self.record(Method::GetPools, None)?;
        ids.into_iter()
            .map(|id| {
                let pool = self.get(id)?;
                Ok(PoolInfo {
                    id,
                    pool_type: "balancer".into(),
                    total_shares: Coin { denom: Self::share_denom(id), amount: pool.total_shares },
                    assets: pool
                        .reserves
                        .iter()
                        .map(|token| PoolAsset { token: token.clone(), weight: Amount::from_u64(1) })
                        .collect(),
                    params: pool.params,
                })
            })
            .collect()
    }

    fn pool_type(&self, pool_id: u64) -> Result<String, EngineError> {
        self.record(Method::GetPoolType, None)?;
        self.get(pool_id)?;
        Ok("balancer".into())
    }

    fn pool_params(&self, pool_id: u64) -> Result<PoolParams, EngineError> {
        self.record(Method::GetPoolParams, None)?;
        Ok(self.get(pool_id)?.params)
    }

    fn total_shares(&self, pool_id: u64) -> Result<Coin, EngineError> {
        self.record(Method::GetTotalShares, None)?;
        let pool = self.get(pool_id)?;
        Ok(Coin { denom: Self::share_denom(pool_id), amount: pool.total_shares })
    }

    fn total_liquidity(&self) -> Result<Vec<Coin>, EngineError> {
        self.record(Method::GetTotalLiquidity, None)?;
        let mut totals: BTreeMap<&str, U256> = BTreeMap::new();
        for reserve in self.pools.values().flat_map(|pool| &pool.reserves) {
            *totals.entry(reserve.denom.as_str()).or_default() += reserve.amount.get();
        }
        totals
            .into_iter()
            .map(|(denom, total)| Ok(Coin { denom: denom.to_string(), amount: amount(total)? }))
            .collect()
    }

    fn calc_join_pool_no_swap_shares(
        &self,
        pool_id: u64,
        tokens_in: &[Coin],
    ) -> Result<CalcJoinPoolResponse, EngineError> {
        self.record(Method::CalcJoinPoolNoSwapShares, None)?;
        Self::no_swap_shares(self.get(pool_id)?, tokens_in)
    }

    fn calc_exit_pool_coins_from_shares(
        &self,
        pool_id: u64,
        share_in_amount: Amount,
    ) -> Result<Vec<Coin>, EngineError> {
        self.record(Method::CalcExitPoolCoinsFromShares, None)?;
        let pool = self.get(pool_id)?;
        if share_in_amount > pool.total_shares {
            return Err(EngineError::InvalidArgument("share in exceeds total shares".into()));
        }
        proportional(pool, share_in_amount.get(), Rounding::Down)
    }

    fn calc_join_pool_shares(
        &self,
        pool_id: u64,
        tokens_in: &[Coin],
    ) -> Result<CalcJoinPoolResponse, EngineError> {
        self.record(Method::CalcJoinPoolShares, None)?;
        let pool = self.get(pool_id)?;
        let [single] = tokens_in else { return Self::no_swap_shares(pool, tokens_in) };

        // single-asset join: half of the input is swapped into the other reserve
        let reserve = &pool.reserves[pool.reserve(&single.denom)?];
        let scale = U256::from(FEE_SCALE);
        let half_fee = pool.params.swap_fee.get() / U256::from(2u64);
        let effective = single.amount.get() * (scale - half_fee) / scale;
        let shares = pool.total_shares.get() * effective /
            (U256::from(2u64) * reserve.amount.get() + effective);
        Ok(CalcJoinPoolResponse {
            share_out_amount: amount(shares)?,
            tokens_out: vec![single.clone()],
        })
    }
}
