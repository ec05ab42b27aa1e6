use crate::types::SlotIndex;

// Transfer pacing

/// Elements moved per coordinator `step()` before control returns to the
/// host scheduler.
///
/// Every loop that could touch an unbounded amount of data (draining typed
/// sequences, reading a round back, feeding the codec) is cut into slices
/// of this size so one transfer shares a scheduling step fairly with host
/// events and other in-flight transfers. Slice boundaries are safe
/// suspension points: the data being processed is exclusively owned by the
/// one transfer.
pub const DEFAULT_WORK_SLICE: usize = 64;

/// Longest printable chunk the base64 encoder may emit.
///
/// Keeps each chunk comfortably inside the string-length limits of typical
/// host environments; the encoded characters travel one integer per slot
/// either way, so the bound only shapes chunk boundaries.
pub const DEFAULT_MAX_CHUNK_LEN: usize = 180;

/// Scalar slots occupied by the metadata record, in slot order:
/// int count, real count, bool count, encoded character count, round count.
pub const METADATA_SLOTS: SlotIndex = 5;
