//! Stable binary encoding of opaque query results.
//!
//! `getPool`, `getPools` and `getPoolParams` return RLP payloads wrapped in an ABI `bytes`.

use alloy_primitives::Bytes;
use alloy_rlp::Decodable;

use crate::types::{PoolInfo, PoolParams};

/// Encodes a pool snapshot.
pub fn encode_pool(pool: &PoolInfo) -> Bytes {
    alloy_rlp::encode(pool).into()
}

/// Encodes a page of pool snapshots as an RLP list.
pub fn encode_pools(pools: &[PoolInfo]) -> Bytes {
    let mut out = Vec::new();
    alloy_rlp::encode_list::<_, PoolInfo>(pools, &mut out);
    out.into()
}

/// Encodes pool parameters.
pub fn encode_pool_params(params: &PoolParams) -> Bytes {
    alloy_rlp::encode(params).into()
}

/// Decodes a payload produced by [`encode_pool`].
pub fn decode_pool(mut data: &[u8]) -> alloy_rlp::Result<PoolInfo> {
    PoolInfo::decode(&mut data)
}

/// Decodes a payload produced by [`encode_pools`].
pub fn decode_pools(mut data: &[u8]) -> alloy_rlp::Result<Vec<PoolInfo>> {
    Vec::<PoolInfo>::decode(&mut data)
}

/// Decodes a payload produced by [`encode_pool_params`].
pub fn decode_pool_params(mut data: &[u8]) -> alloy_rlp::Result<PoolParams> {
    PoolParams::decode(&mut data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coin, PoolAsset};

    fn pool(id: u64) -> PoolInfo {
        PoolInfo {
            id,
            pool_type: "balancer".into(),
            total_shares: Coin::new(format!("gamm/pool/{id}"), 100u64),
            assets: vec![
                PoolAsset { token: Coin::new("uatom", 5u64), weight: 1u64.into() },
                PoolAsset { token: Coin::new("uosmo", 7u64), weight: 1u64.into() },
            ],
            params: PoolParams::default(),
        }
    }

    #[test]
    fn test_pools_list_decodes() {
        let pools = vec![pool(1), pool(2)];
        assert_eq!(decode_pools(&encode_pools(&pools)).unwrap(), pools);
        assert_eq!(decode_pools(&encode_pools(&[])).unwrap(), Vec::new());
    }

    #[test]
    fn test_truncated_payload_is_rejected() {
        let encoded = encode_pool(&pool(1));
        assert!(decode_pool(&encoded[..encoded.len() - 1]).is_err());
    }
}
