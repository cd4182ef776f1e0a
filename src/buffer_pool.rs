//! Lock-free buffer pool for read-chunk allocation

use bytes::BytesMut;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;

/// Fixed-size pool of reusable read buffers backed by crossbeam's
/// lock-free queue.
pub struct ChunkPool {
    queue: crossbeam_queue::ArrayQueue<BytesMut>,
    chunk_size: usize,
    reuses: AtomicUsize,
}

impl ChunkPool {
    /// Create a pool holding at most `max_buffers` buffers of `chunk_size`.
    pub fn new(max_buffers: usize, chunk_size: usize) -> Self {
        Self {
            queue: crossbeam_queue::ArrayQueue::new(max_buffers),
            chunk_size,
            reuses: AtomicUsize::new(0),
        }
    }

    /// Pop a pooled buffer, or allocate when the pool is empty.
    pub fn try_get(&self) -> BytesMut {
        match self.queue.pop() {
            Some(buf) => {
                self.reuses.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => BytesMut::with_capacity(self.chunk_size),
        }
    }

    /// Return a buffer. Silently dropped when the pool is full or the
    /// capacity drifted too far from the tier size.
    pub fn try_put(&self, mut buf: BytesMut) {
        if buf.capacity() >= self.chunk_size / 2 && buf.capacity() <= self.chunk_size * 2 {
            buf.clear();
            let _ = self.queue.push(buf);
        }
    }

    /// Pool statistics: (reuses, buffers currently pooled).
    pub fn stats(&self) -> (usize, usize) {
        (self.reuses.load(Ordering::Relaxed), self.queue.len())
    }
}

// Tier boundaries: stream read chunks default to 8 KiB, with a small tier
// for line-oriented peers and a bulk tier for configured large reads.
//   SMALL:   chunk_size=2048   → get ≤2048,  put accepts capacity 1024..=4096
//   DEFAULT: chunk_size=8192   → get ≤8192,  put accepts capacity 4096..=16384
//   BULK:    chunk_size=65536  → get >8192,  put accepts capacity 32768..=131072

static SMALL_CHUNK_POOL: LazyLock<ChunkPool> = LazyLock::new(|| ChunkPool::new(1024, 2048));
static DEFAULT_CHUNK_POOL: LazyLock<ChunkPool> = LazyLock::new(|| ChunkPool::new(512, 8192));
static BULK_CHUNK_POOL: LazyLock<ChunkPool> = LazyLock::new(|| ChunkPool::new(64, 65536));

/// Get a buffer from the global pool (non-blocking).
pub fn try_get_buffer(size_hint: usize) -> BytesMut {
    if size_hint <= 2048 {
        SMALL_CHUNK_POOL.try_get()
    } else if size_hint <= 8192 {
        DEFAULT_CHUNK_POOL.try_get()
    } else {
        BULK_CHUNK_POOL.try_get()
    }
}

/// Return a buffer to the global pool (non-blocking).
/// Uses the same tier boundaries as `try_get_buffer` for consistency.
pub fn try_put_buffer(buf: BytesMut) {
    let capacity = buf.capacity();
    if capacity <= 4096 {
        SMALL_CHUNK_POOL.try_put(buf);
    } else if capacity <= 16384 {
        DEFAULT_CHUNK_POOL.try_put(buf);
    } else {
        BULK_CHUNK_POOL.try_put(buf);
    }
}

/// Get buffer pool statistics for monitoring.
pub fn buffer_pool_stats() -> Vec<(&'static str, usize, usize)> {
    vec![
        (
            "small",
            SMALL_CHUNK_POOL.stats().0,
            SMALL_CHUNK_POOL.stats().1,
        ),
        (
            "default",
            DEFAULT_CHUNK_POOL.stats().0,
            DEFAULT_CHUNK_POOL.stats().1,
        ),
        ("bulk", BULK_CHUNK_POOL.stats().0, BULK_CHUNK_POOL.stats().1),
    ]
}
