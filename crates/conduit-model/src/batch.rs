use crate::row::Row;

/// An ordered sequence of rows, bounded by `chunk_size` on the producer
/// side. Batches are opaque to the Coordinator — it only moves them.
#[derive(Debug, Clone)]
pub struct Batch {
    pub seq: u64,
    pub rows: Vec<Row>,
}

impl Batch {
    pub fn new(seq: u64, rows: Vec<Row>) -> Self {
        Batch { seq, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
