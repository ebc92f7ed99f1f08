//! Domain types exchanged between the bridge and the AMM engine.

use core::{fmt, str::FromStr};

use alloy_primitives::{Address, U256};
use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{codec::bech32, constants::bounds::MAX_AMOUNT, BridgeError};

/// A non-negative amount bounded by the maximum of a signed 256-bit integer.
///
/// The bound is enforced at construction, so every `Amount` in flight is within
/// `[0, 2^255 - 1]`.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
#[display("{_0}")]
pub struct Amount(U256);

/// Error returned when a value cannot be turned into an [`Amount`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The value is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// The value exceeds [`MAX_AMOUNT`].
    #[error("amount overflow: exceeds maximum of 2^255-1")]
    Overflow,
    /// The value is not a decimal integer.
    #[error("invalid amount {0:?}")]
    Malformed(String),
}

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(U256::ZERO);

    /// The largest representable amount.
    pub const MAX: Self = Self(MAX_AMOUNT);

    /// Creates an amount, rejecting values above [`MAX_AMOUNT`].
    pub fn new(value: U256) -> Result<Self, AmountError> {
        if value > MAX_AMOUNT {
            return Err(AmountError::Overflow);
        }
        Ok(Self(value))
    }

    /// Creates an amount from a `u64`.
    pub const fn from_u64(value: u64) -> Self {
        Self(U256::from_limbs([value, 0, 0, 0]))
    }

    /// Returns the amount as a `U256`.
    pub const fn get(self) -> U256 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Adds two amounts, returning `None` past [`Amount::MAX`].
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).and_then(|sum| Self::new(sum).ok())
    }

    /// Subtracts `other`, returning `None` on underflow.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<Amount> for U256 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl TryFrom<U256> for Amount {
    type Error = AmountError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(magnitude) => (true, magnitude),
            None => (false, s),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Malformed(s.to_owned()));
        }
        if negative {
            // "-0" is still zero
            return if digits.bytes().all(|b| b == b'0') {
                Ok(Self::ZERO)
            } else {
                Err(AmountError::Negative)
            };
        }
        // digits beyond U256 are an overflow, not a malformed number
        let value = U256::from_str_radix(s, 10).map_err(|_| AmountError::Overflow)?;
        Self::new(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal amount as a string or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount::from_u64(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                u64::try_from(v).map(Amount::from_u64).map_err(|_| E::custom(AmountError::Negative))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
                Err(E::custom(AmountError::Malformed(v.to_string())))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

impl Encodable for Amount {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.encode(out);
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for Amount {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Self::new(U256::decode(buf)?).map_err(|_| alloy_rlp::Error::Custom("amount overflow"))
    }
}

/// A denominated amount.
#[derive(
    Clone,
    Debug,
    Hash,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    RlpEncodable,
    RlpDecodable,
    derive_more::Display,
)]
#[display("{amount}{denom}")]
pub struct Coin {
    /// Denomination of the coin.
    pub denom: String,
    /// Amount of the coin.
    pub amount: Amount,
}

impl Coin {
    /// Creates a coin.
    pub fn new(denom: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self { denom: denom.into(), amount: amount.into() }
    }
}

/// Renders a coin list in its canonical `100uatom,200uosmo` form.
pub fn format_coins(coins: &[Coin]) -> String {
    coins.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

/// One hop of a swap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{pool_id}:{token_out_denom}")]
pub struct SwapRoute {
    /// Pool traversed by the hop.
    #[serde(with = "lenient_u64")]
    pub pool_id: u64,
    /// Denomination received from the hop.
    pub token_out_denom: String,
}

/// Renders a route list in its canonical `[1:uosmo,2:uatom]` form.
pub fn format_routes(routes: &[SwapRoute]) -> String {
    let hops: Vec<_> = routes.iter().map(ToString::to_string).collect();
    format!("[{}]", hops.join(","))
}

/// A fee recipient taking a cut of a swap output, in basis points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliate {
    /// EVM address of the recipient.
    pub address: Address,
    /// Fee in basis points, at most 10 000.
    pub basis_points_fee: Amount,
}

/// Parameters of the IBC transfer following a swap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbcTransferInfo {
    /// Channel on this chain the transfer leaves through.
    pub source_channel: String,
    /// Receiver on the counterparty chain.
    pub receiver: String,
    /// Free-form memo forwarded with the packet.
    #[serde(default)]
    pub memo: String,
    /// Absolute timeout, in seconds. Must be past the current block timestamp.
    #[serde(with = "lenient_u64")]
    pub timeout_timestamp: u64,
}

/// A page of a listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Number of entries skipped.
    #[serde(default, with = "lenient_u64")]
    pub offset: u64,
    /// Maximum number of entries returned.
    #[serde(with = "lenient_u64")]
    pub limit: u64,
}

/// The verified identity attached to every state-mutating engine call.
///
/// It can only be built from the EVM caller, never from calldata or a JSON payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Sender {
    address: Address,
    bech32: String,
}

impl Sender {
    /// Derives the sender from the EVM caller. The zero address is rejected as
    /// [`ErrorCode::Unauthorized`](crate::ErrorCode::Unauthorized).
    pub fn from_caller(caller: Address, prefix: &str) -> Result<Self, BridgeError> {
        if caller.is_zero() {
            return Err(BridgeError::unauthorized("caller cannot be the zero address"));
        }
        let bech32 = bech32::encode_address(prefix, caller)
            .map_err(|err| BridgeError::internal("failed to derive sender").with_detail(err))?;
        Ok(Self { address: caller, bech32 })
    }

    /// The EVM address of the sender.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The chain-native bech32 address of the sender.
    pub fn bech32(&self) -> &str {
        &self.bech32
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bech32)
    }
}

/// One reserve of a pool and its weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, RlpEncodable, RlpDecodable)]
pub struct PoolAsset {
    /// Reserve balance.
    pub token: Coin,
    /// Relative weight of the reserve.
    pub weight: Amount,
}

/// Fee parameters of a pool, as fixed-point decimals with 18 fractional digits.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, RlpEncodable, RlpDecodable,
)]
pub struct PoolParams {
    /// Fee charged on swap inputs.
    pub swap_fee: Amount,
    /// Fee charged on exit outputs.
    pub exit_fee: Amount,
}

/// Snapshot of a pool returned by pool queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, RlpEncodable, RlpDecodable)]
pub struct PoolInfo {
    /// Pool identifier.
    pub id: u64,
    /// Engine-specific pool type name.
    pub pool_type: String,
    /// Outstanding shares, denominated in the pool share denom.
    pub total_shares: Coin,
    /// Reserves of the pool.
    pub assets: Vec<PoolAsset>,
    /// Fee parameters.
    pub params: PoolParams,
}

/// Accepts a `u64` either as a JSON number or as a decimal string.
pub(crate) mod lenient_u64 {
    use core::fmt;

    use serde::{de, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(*value)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        struct U64Visitor;

        impl de::Visitor<'_> for U64Visitor {
            type Value = u64;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an unsigned 64-bit integer as a number or a string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
                Ok(v)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
                u64::try_from(v).map_err(|_| E::custom(format!("{v} cannot be negative")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
                v.trim().parse().map_err(|_| E::custom(format!("invalid unsigned integer {v:?}")))
            }
        }

        deserializer.deserialize_any(U64Visitor)
    }
}
