/// Order-sensitive 32-bit hash of a seed key.
///
/// Each byte is folded into the state with a multiply and rotate, then the state
/// goes through a final avalanche so that keys differing in one character land
/// far apart.
pub fn hash_key(key: &str) -> u32 {
    let mut h: u32 = 1_779_033_703 ^ key.len() as u32;
    for byte in key.bytes() {
        h = (h ^ byte as u32).wrapping_mul(3_432_918_353);
        h = h.rotate_left(13);
    }
    h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
    h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
    h ^ (h >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash_key("FGA|A:1|0.5"), hash_key("FGA|A:1|0.5"));
    }

    #[test]
    fn test_hash_is_order_sensitive() {
        assert_ne!(hash_key("ab"), hash_key("ba"));
        assert_ne!(hash_key("A:0.7;B:0.3"), hash_key("B:0.3;A:0.7"));
    }

    #[test]
    fn test_hash_empty_key() {
        assert_eq!(hash_key(""), hash_key(""));
        assert_ne!(hash_key(""), hash_key(" "));
    }

    #[test]
    fn test_hash_spreads_similar_keys() {
        let hashes: Vec<u32> = (0..100).map(|i| hash_key(&format!("seed{}", i))).collect();
        let mut unique = hashes.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), hashes.len());
    }
}
