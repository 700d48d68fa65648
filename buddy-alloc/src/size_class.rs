//! Size-class rounding: requested bytes to block size, block size to order.

/// The smallest power of two that is at least `min_block_size` and at least
/// `n`. If `n` is already a power of two no smaller than `min_block_size`,
/// returns `n` unchanged.
pub fn round_up_size_class(n: usize, min_block_size: usize) -> usize {
    n.max(min_block_size).next_power_of_two()
}

/// The order `k` such that `2^k == round_up_size_class(rsize + header_size,
/// min_block_size)`.
///
/// Caller must ensure `0 < rsize` and `rsize + header_size` does not
/// overflow `usize`.
pub fn order_of(rsize: usize, header_size: usize, min_block_size: usize) -> u32 {
    round_up_size_class(rsize + header_size, min_block_size).ilog2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_next_power_of_two() {
        assert_eq!(round_up_size_class(9, 32), 32);
        assert_eq!(round_up_size_class(33, 32), 64);
    }

    #[test]
    fn exact_power_of_two_unchanged() {
        assert_eq!(round_up_size_class(64, 32), 64);
    }

    #[test]
    fn floors_at_min_block_size() {
        assert_eq!(round_up_size_class(1, 32), 32);
    }

    #[test]
    fn order_of_matches_scenario_s2() {
        // ORDER_MIN = 5, H = 8: allocate(8) needs a 16-byte block, rounded
        // up to MIN_BLOCK_SIZE = 32 = 2^5.
        assert_eq!(order_of(8, 8, 32), 5);
    }

    #[test]
    fn order_of_is_monotonic() {
        let mut prev = order_of(1, 8, 32);
        for r in 1..4096usize {
            let k = order_of(r, 8, 32);
            assert!(k >= prev);
            prev = k;
        }
    }
}
