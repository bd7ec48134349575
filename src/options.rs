/// Rows per decoded batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 2048;

/// Options for opening a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Rows to skip before the first `next_row`.
    pub start_offset: u64,

    /// Restart from the first row instead of ending when the data runs out.
    pub circular: bool,

    /// Rows per decoded batch. Zero is treated as one.
    pub batch_size: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            start_offset: 0,
            circular: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ReaderOptions {
    pub fn with_start_offset(mut self, start_offset: u64) -> Self {
        self.start_offset = start_offset;
        self
    }

    pub fn with_circular(mut self, circular: bool) -> Self {
        self.circular = circular;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}
