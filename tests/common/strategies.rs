use proptest::prelude::*;

/// Resume offsets, including the origin and values around 2.
pub fn start_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        Just(0u64),
        Just(1u64),
        Just(2u64),
        Just(3u64),
        0u64..100_000,
        (u64::MAX / 2)..(u64::MAX / 2 + 1_000),
    ]
}

/// Partition widths, from degenerate single integers upwards.
pub fn batch_size_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![Just(1u64), Just(2u64), 1u64..500]
}

pub fn worker_count_strategy() -> impl Strategy<Value = usize> {
    1usize..12
}

/// Small scan windows that are cheap to check by trial division.
pub fn small_window_strategy() -> impl Strategy<Value = (u64, u64)> {
    (0u64..20_000, 1u64..400).prop_map(|(lo, width)| (lo, lo + width))
}
