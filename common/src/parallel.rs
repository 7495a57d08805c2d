//! Work partitioning for thread-pool pipelines.

/// Multiplier for number of chunks relative to worker threads.
pub const CHUNKS_PER_THREAD: usize = 2;

/// Size of each chunk when `len` items are split across `threads` workers.
///
/// Aims for `threads * CHUNKS_PER_THREAD` chunks. Minimum of 1 item per chunk.
#[inline]
pub fn chunk_size(len: usize, threads: usize) -> usize {
    let num_chunks = threads.max(1) * CHUNKS_PER_THREAD;
    len.div_ceil(num_chunks).max(1)
}
