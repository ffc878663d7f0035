/// Full-avalanche 64-bit integer finalizer (Thomas Wang's 64-bit mix).
///
/// Boards that differ in a single packed nibble land in unrelated buckets,
/// which a plain modulus of the packed key would not give us.
#[inline]
pub fn mix64(key: u64) -> u64 {
    let mut key = (!key).wrapping_add(key << 21);
    key ^= key >> 24;
    key = key.wrapping_mul(265);
    key ^= key >> 14;
    key = key.wrapping_mul(21);
    key ^= key >> 28;
    key.wrapping_add(key << 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix64_is_deterministic() {
        assert_eq!(mix64(0x7100_6300_3510_2200), mix64(0x7100_6300_3510_2200));
    }

    #[test]
    fn test_mix64_disperses_neighbouring_keys() {
        let a = mix64(0x1000_0000_0000_0000);
        let b = mix64(0x1000_0000_0000_0001);
        assert_ne!(a & 0xFFF, b & 0xFFF);
        assert!((a ^ b).count_ones() > 8);
    }
}
