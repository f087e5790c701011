use super::*;

fn fenced() -> MemPool {
    MemPool::new(PoolFlags::FENCE, 1024).unwrap()
}

#[test]
fn write_past_end_is_caught_on_free() {
    let mut pool = fenced();
    let a = pool.alloc(16).unwrap();
    pool.bytes_mut(&a).unwrap().copy_from_slice(&[7u8; 16]);
    // 17th byte lands in the trailing fence
    pool.write_at(&a, 16, &[0xAA]).unwrap();
    let err = pool.free(a, 16).unwrap_err();
    assert!(matches!(err, Error::MempoolOverflow { size: 16, .. }));
    assert!(err.is_fatal());
}

#[test]
fn write_before_start_is_caught() {
    let mut pool = fenced();
    let a = pool.alloc(8).unwrap();
    let b = pool.alloc(8).unwrap();
    // a's span is fence + 8 + fence, so writing 16 bytes from a's end reaches b's leading fence
    pool.write_at(&a, 8, &[0u8; 16]).unwrap();
    assert!(matches!(pool.free(b, 8), Err(Error::MempoolOverflow { .. })));
}

#[test]
fn in_bounds_writes_free_cleanly() {
    let mut pool = fenced();
    let a = pool.alloc(16).unwrap();
    pool.write_at(&a, 0, &[1u8; 16]).unwrap();
    assert_eq!(pool.bytes(&a).unwrap(), &[1u8; 16]);
    pool.free(a, 16).unwrap();
    assert_eq!(pool.stats().live_allocations, 0);
}

#[test]
fn double_free_is_reported() {
    let mut pool = MemPool::new(PoolFlags::NONE, 256).unwrap();
    let a = pool.alloc(10).unwrap();
    pool.free(a, 10).unwrap();
    assert_eq!(pool.free(a, 10), Err(Error::MempoolAlreadyFree));

    // the chunk gets recycled; the old handle must still be rejected
    let b = pool.alloc(10).unwrap();
    assert_eq!(pool.free(a, 10), Err(Error::MempoolAlreadyFree));
    assert_eq!(pool.bytes(&a), Err(Error::MempoolAlreadyFree));
    pool.free(b, 10).unwrap();
}

#[test]
fn size_mismatch_is_illegal_size() {
    let mut pool = MemPool::new(PoolFlags::NONE, 256).unwrap();
    let a = pool.alloc(10).unwrap();
    assert!(matches!(pool.free(a, 11), Err(Error::IllegalSize(_))));
    pool.free(a, 10).unwrap();
}

#[test]
fn handles_from_other_pools_are_invalid() {
    let mut p1 = MemPool::new(PoolFlags::NONE, 256).unwrap();
    let mut p2 = MemPool::new(PoolFlags::NONE, 256).unwrap();
    let a = p1.alloc(4).unwrap();
    assert_eq!(p2.free(a, 4), Err(Error::InvalidHandle));
    assert_eq!(p2.bytes(&a), Err(Error::InvalidHandle));
}

#[test]
fn clear_invalidates_and_keeps_blocks() {
    let mut pool = MemPool::new(PoolFlags::NONE, 128).unwrap();
    let a = pool.alloc(64).unwrap();
    let _big = pool.alloc(1000).unwrap();
    let before = pool.stats();
    assert_eq!(before.blocks, 2);
    assert_eq!(before.oversized_blocks, 1);

    pool.clear();
    let after = pool.stats();
    assert_eq!(after.blocks, 1);
    assert_eq!(after.live_allocations, 0);
    assert_eq!(after.bytes_live, 0);
    assert_eq!(pool.free(a, 64), Err(Error::InvalidHandle));

    pool.alloc(64).unwrap();
    assert_eq!(pool.stats().blocks, 1);
}

#[test]
fn zeroed_alloc_zero_fills_and_checks_overflow() {
    let mut pool = MemPool::new(PoolFlags::NONE, 64).unwrap();
    let a = pool.alloc(32).unwrap();
    pool.bytes_mut(&a).unwrap().fill(0xFF);
    pool.free(a, 32).unwrap();

    let z = pool.zeroed_alloc(4, 8).unwrap();
    assert!(pool.bytes(&z).unwrap().iter().all(|&b| b == 0));
    assert!(matches!(pool.zeroed_alloc(usize::MAX, 2), Err(Error::IllegalSize(_))));
}

#[test]
fn zero_size_allocations_are_distinct() {
    let mut pool = fenced();
    let a = pool.alloc(0).unwrap();
    let b = pool.alloc(0).unwrap();
    assert_ne!(a, b);
    assert!(pool.bytes(&a).unwrap().is_empty());
    pool.free(a, 0).unwrap();
    pool.free(b, 0).unwrap();
}

#[test]
fn allocations_fill_blocks_then_grow() {
    let mut pool = MemPool::new(PoolFlags::NONE, 64).unwrap();
    for _ in 0..8 {
        pool.alloc(8).unwrap();
    }
    assert_eq!(pool.stats().blocks, 1);
    pool.alloc(8).unwrap();
    let stats = pool.stats();
    assert_eq!(stats.blocks, 2);
    assert_eq!(stats.bytes_reserved, 128);
    assert_eq!(stats.live_allocations, 9);
    assert_eq!(stats.bytes_live, 72);
}

#[test]
fn write_outside_block_is_rejected() {
    let mut pool = MemPool::new(PoolFlags::NONE, 32).unwrap();
    let a = pool.alloc(8).unwrap();
    assert!(matches!(pool.write_at(&a, 30, &[0u8; 4]), Err(Error::IllegalIndex { .. })));
}

#[test]
fn zero_block_size_is_rejected() {
    assert!(matches!(MemPool::new(PoolFlags::NONE, 0), Err(Error::IllegalSize(_))));
}

#[test]
fn from_config_honors_fence() {
    let config = PoolConfig {
        default_block_size: 512,
        fence: true,
    };
    let pool = MemPool::from_config(&config).unwrap();
    assert!(pool.flags().contains(PoolFlags::FENCE));
    assert_eq!(pool.block_size(), 512);
}

#[test]
fn freed_oversized_blocks_are_released() {
    let mut pool = MemPool::new(PoolFlags::NONE, 64).unwrap();
    for size in (800..3200).step_by(8) {
        let a = pool.alloc(size).unwrap();
        pool.free(a, size).unwrap();
    }
    let stats = pool.stats();
    assert_eq!(stats.live_allocations, 0);
    assert_eq!(stats.blocks, 0);
    assert_eq!(stats.oversized_blocks, 0);
    assert_eq!(stats.bytes_reserved, 0);

    // the released slot is reused and stale handles stay dead
    let a = pool.alloc(1000).unwrap();
    pool.free(a, 1000).unwrap();
    let b = pool.alloc(2000).unwrap();
    assert_eq!(pool.stats().blocks, 1);
    assert_eq!(pool.bytes(&a), Err(Error::MempoolAlreadyFree));
    assert_eq!(pool.bytes(&b).unwrap().len(), 2000);
}

#[test]
fn oversized_fence_violation_keeps_the_block() {
    let mut pool = MemPool::new(PoolFlags::FENCE, 64).unwrap();
    let a = pool.alloc(200).unwrap();
    pool.write_at(&a, 200, &[0]).unwrap();
    assert!(matches!(pool.free(a, 200), Err(Error::MempoolOverflow { .. })));
    assert_eq!(pool.stats().oversized_blocks, 1);
    assert_eq!(pool.stats().live_allocations, 1);
}

#[test]
fn from_config_validates() {
    let config = PoolConfig {
        default_block_size: 0,
        fence: false,
    };
    assert!(MemPool::from_config(&config).is_err());
}

#[test]
fn handle_order_separates_reused_positions() {
    let mut pool = MemPool::new(PoolFlags::NONE, 64).unwrap();
    let stale = pool.alloc(8).unwrap();
    pool.clear();
    let fresh = pool.alloc(8).unwrap();
    assert_eq!(stale.identity(), fresh.identity());
    assert!(!stale.same_ref(&fresh));
    assert_ne!(stale.compare_ref(&fresh), std::cmp::Ordering::Equal);
}
