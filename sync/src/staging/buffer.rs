use super::error::StagingError;

/// Gate on the staging buffer. `Write` while the payload is being
/// populated, `Locked` while the coordinator owns the buffer for a
/// transfer, `Read` once a payload may be consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferMode {
    Write,
    Read,
    Locked,
}

/// One typed sequence with independent write and read cursors. Reads do not
/// remove: rewinding the cursor replays the sequence.
struct Lane<T> {
    values: Vec<T>,
    cursor: usize,
}

impl<T: Clone> Lane<T> {
    fn new() -> Self {
        Self {
            values: Vec::new(),
            cursor: 0,
        }
    }

    fn write(&mut self, value: T) {
        self.values.push(value);
    }

    fn read(&mut self) -> Option<T> {
        let value = self.values.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(value)
    }

    fn has_unread(&self) -> bool {
        self.cursor < self.values.len()
    }

    fn count(&self) -> usize {
        self.values.len()
    }

    fn position(&self) -> usize {
        self.cursor
    }

    fn reset_read(&mut self) {
        self.cursor = 0;
    }

    fn clear(&mut self) {
        self.values.clear();
        self.cursor = 0;
    }
}

/// Mode-gated container holding one transfer's payload: four independent
/// typed sequences (ints, reals, bools, strings) with separate read/write
/// cursors per type. Write order defines read order; callers must read back
/// in exactly the order they wrote.
pub struct StagingBuffer {
    mode: BufferMode,
    ints: Lane<i32>,
    reals: Lane<f32>,
    bools: Lane<bool>,
    strings: Lane<String>,
}

impl StagingBuffer {
    pub fn new() -> Self {
        Self {
            mode: BufferMode::Write,
            ints: Lane::new(),
            reals: Lane::new(),
            bools: Lane::new(),
            strings: Lane::new(),
        }
    }

    pub fn mode(&self) -> BufferMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: BufferMode) {
        self.mode = mode;
    }

    fn check_mode(
        &self,
        required: BufferMode,
        op: &'static str,
        kind: &'static str,
    ) -> Result<(), StagingError> {
        if self.mode == required {
            return Ok(());
        }
        Err(StagingError::ModeViolation {
            op,
            kind,
            mode: self.mode,
            required,
        })
    }

    // Writes, gated on Write mode

    pub fn try_write_int(&mut self, value: i32) -> Result<(), StagingError> {
        self.check_mode(BufferMode::Write, "write", "int")?;
        self.ints.write(value);
        Ok(())
    }

    pub fn try_write_real(&mut self, value: f32) -> Result<(), StagingError> {
        self.check_mode(BufferMode::Write, "write", "real")?;
        self.reals.write(value);
        Ok(())
    }

    pub fn try_write_bool(&mut self, value: bool) -> Result<(), StagingError> {
        self.check_mode(BufferMode::Write, "write", "bool")?;
        self.bools.write(value);
        Ok(())
    }

    pub fn try_write_string(&mut self, value: String) -> Result<(), StagingError> {
        self.check_mode(BufferMode::Write, "write", "string")?;
        self.strings.write(value);
        Ok(())
    }

    // Reads, gated on Read mode, FIFO per type

    pub fn try_read_int(&mut self) -> Result<i32, StagingError> {
        self.check_mode(BufferMode::Read, "read", "int")?;
        let position = self.ints.position();
        self.ints.read().ok_or(StagingError::UnsafeAccess {
            kind: "int",
            position,
            written: self.ints.count(),
        })
    }

    pub fn try_read_real(&mut self) -> Result<f32, StagingError> {
        self.check_mode(BufferMode::Read, "read", "real")?;
        let position = self.reals.position();
        self.reals.read().ok_or(StagingError::UnsafeAccess {
            kind: "real",
            position,
            written: self.reals.count(),
        })
    }

    pub fn try_read_bool(&mut self) -> Result<bool, StagingError> {
        self.check_mode(BufferMode::Read, "read", "bool")?;
        let position = self.bools.position();
        self.bools.read().ok_or(StagingError::UnsafeAccess {
            kind: "bool",
            position,
            written: self.bools.count(),
        })
    }

    pub fn try_read_string(&mut self) -> Result<String, StagingError> {
        self.check_mode(BufferMode::Read, "read", "string")?;
        let position = self.strings.position();
        self.strings.read().ok_or(StagingError::UnsafeAccess {
            kind: "string",
            position,
            written: self.strings.count(),
        })
    }

    // Panicking conveniences for paths that already know the mode and the
    // element's presence, e.g. internal transfer rounds

    /// # Panics
    /// Panics on a mode violation. For the checked version, use
    /// `try_write_int`.
    pub fn write_int(&mut self, value: i32) {
        self.try_write_int(value)
            .expect("staging buffer rejected write");
    }

    /// # Panics
    /// Panics on a mode violation. For the checked version, use
    /// `try_write_real`.
    pub fn write_real(&mut self, value: f32) {
        self.try_write_real(value)
            .expect("staging buffer rejected write");
    }

    /// # Panics
    /// Panics on a mode violation. For the checked version, use
    /// `try_write_bool`.
    pub fn write_bool(&mut self, value: bool) {
        self.try_write_bool(value)
            .expect("staging buffer rejected write");
    }

    /// # Panics
    /// Panics on a mode violation. For the checked version, use
    /// `try_write_string`.
    pub fn write_string(&mut self, value: String) {
        self.try_write_string(value)
            .expect("staging buffer rejected write");
    }

    /// # Panics
    /// Panics on a mode violation or unwritten position. For the checked
    /// version, use `try_read_int`.
    pub fn read_int(&mut self) -> i32 {
        self.try_read_int().expect("staging buffer rejected read")
    }

    /// # Panics
    /// Panics on a mode violation or unwritten position. For the checked
    /// version, use `try_read_real`.
    pub fn read_real(&mut self) -> f32 {
        self.try_read_real().expect("staging buffer rejected read")
    }

    /// # Panics
    /// Panics on a mode violation or unwritten position. For the checked
    /// version, use `try_read_bool`.
    pub fn read_bool(&mut self) -> bool {
        self.try_read_bool().expect("staging buffer rejected read")
    }

    /// # Panics
    /// Panics on a mode violation or unwritten position. For the checked
    /// version, use `try_read_string`.
    pub fn read_string(&mut self) -> String {
        self.try_read_string().expect("staging buffer rejected read")
    }

    // Cursor and count queries, ungated

    pub fn has_int(&self) -> bool {
        self.ints.has_unread()
    }

    pub fn has_real(&self) -> bool {
        self.reals.has_unread()
    }

    pub fn has_bool(&self) -> bool {
        self.bools.has_unread()
    }

    pub fn has_string(&self) -> bool {
        self.strings.has_unread()
    }

    pub fn int_count(&self) -> usize {
        self.ints.count()
    }

    pub fn real_count(&self) -> usize {
        self.reals.count()
    }

    pub fn bool_count(&self) -> usize {
        self.bools.count()
    }

    pub fn string_count(&self) -> usize {
        self.strings.count()
    }

    /// Rewinds every read cursor to the start of its sequence.
    pub fn reset_read(&mut self) {
        self.ints.reset_read();
        self.reals.reset_read();
        self.bools.reset_read();
        self.strings.reset_read();
    }

    /// Drops every value and resets all cursors. The mode is untouched.
    pub fn clear(&mut self) {
        self.ints.clear();
        self.reals.clear();
        self.bools.clear();
        self.strings.clear();
    }
}

impl Default for StagingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
