//! Constants for buffer sizes.

/// The capacity (in bytes) of the buffer used to read chunks of a child's output.
///
/// Reads return as soon as any data is available, so this only bounds the size of a single
/// chunk.
pub const READ_BUFFER_CAPACITY: usize = 8 * 1024;

/// The initial capacity (in bytes) of a capture buffer. Most commands print less than this.
pub const CAPTURE_BUFFER_CAPACITY: usize = 1024;
