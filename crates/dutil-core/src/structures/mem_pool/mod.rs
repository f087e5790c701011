//! Block memory pool with optional overrun fencing
//!
//! The pool carves allocations out of large backing blocks and hands back a
//! [`PoolAlloc`] handle instead of a pointer. Live allocations are tracked in
//! owned metadata, so double frees, size mismatches and stale handles are
//! reported as errors. With [`PoolFlags::FENCE`] every allocation is wrapped
//! in guard bytes that are validated on free.
//!
//! Layout of a fenced chunk (all offsets 8-byte aligned):
//!
//! ```text
//! | fence (8) | payload (size) | fence (8) | padding |
//! ```

use std::collections::HashMap;
use std::ops::BitOr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::constants::{FENCE_PATTERN, FENCE_SIZE, POOL_ALIGN};
use crate::core::config::PoolConfig;
use crate::debug_log;
use crate::types::{Error, Identity, Result};

#[cfg(test)]
mod tests;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Pool creation flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolFlags(u32);

impl PoolFlags {
    /// No special behavior
    pub const NONE: PoolFlags = PoolFlags(0);

    /// Surround every allocation with guard bytes checked on free
    pub const FENCE: PoolFlags = PoolFlags(1);

    /// Check whether all flags in `other` are set
    #[inline]
    pub fn contains(self, other: PoolFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for PoolFlags {
    type Output = PoolFlags;

    fn bitor(self, rhs: PoolFlags) -> PoolFlags {
        PoolFlags(self.0 | rhs.0)
    }
}

/// Handle to a pool allocation
///
/// Handles are plain values; copying one does not duplicate the allocation.
/// A handle stays usable until it is freed or the pool is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolAlloc {
    pool: u64,
    epoch: u64,
    serial: u64,
    block: u32,
    offset: usize,
    size: usize,
}

impl PoolAlloc {
    /// Size requested at allocation time
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Identity for PoolAlloc {
    #[inline]
    fn identity(&self) -> usize {
        ((u64::from(self.block) << 40) ^ self.offset as u64) as usize
    }

    #[inline]
    fn same_ref(&self, other: &Self) -> bool {
        self == other
    }

    // block and offset repeat across clears; the serial and epoch do not
    fn compare_ref(&self, other: &Self) -> std::cmp::Ordering {
        let key = |a: &Self| (a.pool, a.epoch, a.serial, a.block, a.offset, a.size);
        key(self).cmp(&key(other))
    }
}

/// Usage counters of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Backing blocks currently held
    pub blocks: usize,
    /// Bytes reserved by all backing blocks
    pub bytes_reserved: usize,
    /// Bytes requested by live allocations
    pub bytes_live: usize,
    /// Number of live allocations
    pub live_allocations: usize,
    /// Dedicated blocks created for oversized requests
    pub oversized_blocks: usize,
}

struct Block {
    data: Vec<u8>,
    used: usize,
    oversized: bool,
}

impl Block {
    // released dedicated block whose slot awaits reuse
    #[inline]
    fn is_vacant(&self) -> bool {
        self.oversized && self.data.is_empty()
    }
}

#[derive(Clone, Copy)]
struct Live {
    serial: u64,
    size: usize,
}

type Map<K, V> = HashMap<K, V, ahash::RandomState>;

/// Block allocator
pub struct MemPool {
    id: u64,
    flags: PoolFlags,
    block_size: usize,
    blocks: Vec<Block>,
    current: Option<usize>,
    // (block, payload offset) -> live allocation
    live: Map<(u32, usize), Live>,
    // chunk span -> recycled (block, chunk start)
    recycled: Map<usize, Vec<(u32, usize)>>,
    // slots of released dedicated blocks
    vacant: Vec<usize>,
    bytes_live: usize,
    next_serial: u64,
    epoch: u64,
    created: Instant,
}

#[inline]
fn align_up(n: usize) -> Option<usize> {
    n.checked_add(POOL_ALIGN - 1).map(|v| v & !(POOL_ALIGN - 1))
}

impl MemPool {
    /// Create a pool; no block is reserved until the first allocation
    pub fn new(flags: PoolFlags, default_block_size: usize) -> Result<Self> {
        if default_block_size == 0 {
            return Err(Error::illegal_size("pool block size must be greater than 0"));
        }
        Ok(Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            flags,
            block_size: default_block_size,
            blocks: Vec::new(),
            current: None,
            live: Map::default(),
            recycled: Map::default(),
            vacant: Vec::new(),
            bytes_live: 0,
            next_serial: 0,
            epoch: 0,
            created: Instant::now(),
        })
    }

    /// Create a pool from configuration
    pub fn from_config(config: &PoolConfig) -> Result<Self> {
        config.validate()?;
        let flags = if config.fence { PoolFlags::FENCE } else { PoolFlags::NONE };
        Self::new(flags, config.default_block_size)
    }

    /// Flags the pool was created with
    #[inline]
    pub fn flags(&self) -> PoolFlags {
        self.flags
    }

    /// Default block size in bytes
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Time since the pool was created
    pub fn age(&self) -> Duration {
        self.created.elapsed()
    }

    #[inline]
    fn fence(&self) -> usize {
        if self.flags.contains(PoolFlags::FENCE) {
            FENCE_SIZE
        } else {
            0
        }
    }

    fn span_for(&self, size: usize) -> Result<usize> {
        size.checked_add(2 * self.fence())
            .and_then(align_up)
            .map(|span| span.max(POOL_ALIGN))
            .ok_or_else(|| Error::illegal_size(format!("allocation of {} bytes overflows", size)))
    }

    fn new_block(&mut self, len: usize, oversized: bool) -> Result<usize> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        if oversized {
            if let Some(slot) = self.vacant.pop() {
                self.blocks[slot] = Block { data, used: 0, oversized };
                return Ok(slot);
            }
        }
        self.blocks.try_reserve(1)?;
        if u32::try_from(self.blocks.len()).is_err() {
            return Err(Error::OutOfMemory);
        }
        self.blocks.push(Block { data, used: 0, oversized });
        debug_log!(
            "pool {}: new {} block of {} bytes ({} blocks, age {:?})",
            self.id,
            if oversized { "oversized" } else { "regular" },
            len,
            self.blocks.len(),
            self.created.elapsed()
        );
        Ok(self.blocks.len() - 1)
    }

    /// Find room for a chunk of `span` bytes; returns (block, chunk start)
    fn place(&mut self, span: usize) -> Result<(u32, usize)> {
        if let Some(slots) = self.recycled.get_mut(&span) {
            if let Some(found) = slots.pop() {
                return Ok(found);
            }
        }

        if span > self.block_size {
            let block = self.new_block(span, true)?;
            self.blocks[block].used = span;
            return Ok((block as u32, 0));
        }

        if let Some(cur) = self.current {
            let b = &mut self.blocks[cur];
            if b.used + span <= b.data.len() {
                let start = b.used;
                b.used += span;
                return Ok((cur as u32, start));
            }
        }

        // Blocks kept by `clear` are reused before new ones are reserved
        let after = self.current.map_or(0, |c| c + 1);
        let next = self.blocks[after.min(self.blocks.len())..]
            .iter()
            .position(|b| !b.oversized && b.used == 0)
            .map(|p| p + after);
        let block = match next {
            Some(b) => b,
            None => self.new_block(self.block_size, false)?,
        };
        self.current = Some(block);
        self.blocks[block].used = span;
        Ok((block as u32, 0))
    }

    /// Allocate `size` bytes; contents are unspecified
    pub fn alloc(&mut self, size: usize) -> Result<PoolAlloc> {
        let span = self.span_for(size)?;
        let fence = self.fence();
        self.live.try_reserve(1)?;
        let (block, start) = self.place(span)?;

        let offset = start + fence;
        if fence > 0 {
            let data = &mut self.blocks[block as usize].data;
            data[start..offset].fill(FENCE_PATTERN);
            data[offset + size..offset + size + fence].fill(FENCE_PATTERN);
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        self.live.insert((block, offset), Live { serial, size });
        self.bytes_live += size;

        Ok(PoolAlloc {
            pool: self.id,
            epoch: self.epoch,
            serial,
            block,
            offset,
            size,
        })
    }

    /// Allocate `count * elem_size` zero-filled bytes
    pub fn zeroed_alloc(&mut self, count: usize, elem_size: usize) -> Result<PoolAlloc> {
        let size = count.checked_mul(elem_size).ok_or_else(|| {
            Error::illegal_size(format!("{} elements of {} bytes overflow", count, elem_size))
        })?;
        let handle = self.alloc(size)?;
        self.bytes_mut(&handle)?.fill(0);
        Ok(handle)
    }

    fn check(&self, handle: &PoolAlloc) -> Result<Live> {
        if handle.pool != self.id || handle.epoch != self.epoch {
            return Err(Error::InvalidHandle);
        }
        match self.live.get(&(handle.block, handle.offset)) {
            Some(live) if live.serial == handle.serial => Ok(*live),
            _ => Err(Error::MempoolAlreadyFree),
        }
    }

    /// Borrow exactly the bytes of a live allocation
    pub fn bytes(&self, handle: &PoolAlloc) -> Result<&[u8]> {
        let live = self.check(handle)?;
        let data = &self.blocks[handle.block as usize].data;
        Ok(&data[handle.offset..handle.offset + live.size])
    }

    /// Mutably borrow exactly the bytes of a live allocation
    pub fn bytes_mut(&mut self, handle: &PoolAlloc) -> Result<&mut [u8]> {
        let live = self.check(handle)?;
        let data = &mut self.blocks[handle.block as usize].data;
        Ok(&mut data[handle.offset..handle.offset + live.size])
    }

    /// Write `data` at `offset` from the start of an allocation.
    ///
    /// Only the backing block bounds the write, like writing through a raw
    /// pointer into the pool. Writing past the allocation lands in its fence
    /// (or in a neighbouring chunk) and is caught by `free` when fencing is on.
    pub fn write_at(&mut self, handle: &PoolAlloc, offset: usize, data: &[u8]) -> Result<()> {
        self.check(handle)?;
        let block = &mut self.blocks[handle.block as usize].data;
        let start = handle.offset.checked_add(offset);
        let end = start.and_then(|s| s.checked_add(data.len()));
        match (start, end) {
            (Some(start), Some(end)) if end <= block.len() => {
                block[start..end].copy_from_slice(data);
                Ok(())
            }
            _ => Err(Error::IllegalIndex {
                index: offset.saturating_add(data.len()),
                len: block.len() - handle.offset,
            }),
        }
    }

    /// Release an allocation; `size` must be the size it was allocated with.
    ///
    /// A fence violation is reported as [`Error::MempoolOverflow`] and the
    /// allocation stays live.
    pub fn free(&mut self, handle: PoolAlloc, size: usize) -> Result<()> {
        let live = self.check(&handle)?;
        if live.size != size {
            return Err(Error::illegal_size(format!(
                "freed with size {} but allocated with {}",
                size, live.size
            )));
        }

        let fence = self.fence();
        let data = &self.blocks[handle.block as usize].data;
        if fence > 0 {
            let before = &data[handle.offset - fence..handle.offset];
            let after = &data[handle.offset + size..handle.offset + size + fence];
            let intact = |s: &[u8]| s.iter().all(|&b| b == FENCE_PATTERN);
            if !intact(before) || !intact(after) {
                return Err(Error::MempoolOverflow {
                    offset: handle.offset,
                    size,
                });
            }
        }

        let slot = handle.block as usize;
        if self.blocks[slot].oversized {
            // a dedicated block holds exactly one chunk
            self.vacant.try_reserve(1)?;
            self.vacant.push(slot);
            self.blocks[slot].data = Vec::new();
            self.blocks[slot].used = 0;
            debug_log!("pool {}: released dedicated block {}", self.id, slot);
        } else {
            let span = self.span_for(size)?;
            let slots = self.recycled.entry(span).or_default();
            slots.try_reserve(1)?;
            slots.push((handle.block, handle.offset - fence));
        }
        self.live.remove(&(handle.block, handle.offset));
        self.bytes_live -= size;
        Ok(())
    }

    /// Empty every block without releasing regular blocks.
    ///
    /// All handles issued before the call become invalid. Dedicated blocks of
    /// oversized allocations are released.
    pub fn clear(&mut self) {
        self.blocks.retain(|b| !b.oversized);
        for block in &mut self.blocks {
            block.used = 0;
        }
        self.current = if self.blocks.is_empty() { None } else { Some(0) };
        self.live.clear();
        self.recycled.clear();
        self.vacant.clear();
        self.bytes_live = 0;
        self.epoch += 1;
        debug_log!(
            "pool {}: cleared, {} blocks kept (epoch {}, age {:?})",
            self.id,
            self.blocks.len(),
            self.epoch,
            self.created.elapsed()
        );
    }

    /// Current usage counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            blocks: self.blocks.iter().filter(|b| !b.is_vacant()).count(),
            bytes_reserved: self.blocks.iter().map(|b| b.data.len()).sum(),
            bytes_live: self.bytes_live,
            live_allocations: self.live.len(),
            oversized_blocks: self.blocks.iter().filter(|b| b.oversized && !b.is_vacant()).count(),
        }
    }
}

impl Drop for MemPool {
    fn drop(&mut self) {
        debug_log!(
            "pool {}: destroyed with {} live allocations in {} blocks (age {:?})",
            self.id,
            self.live.len(),
            self.blocks.len() - self.vacant.len(),
            self.created.elapsed()
        );
    }
}

impl std::fmt::Debug for MemPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemPool")
            .field("flags", &self.flags)
            .field("block_size", &self.block_size)
            .field("stats", &self.stats())
            .finish()
    }
}
