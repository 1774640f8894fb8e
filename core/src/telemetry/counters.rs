//! telemetry/counters.rs
//! Counters kept by the chunked transform engine.
//!
//! Summary: one set per codec reader, updated on every transform step and
//! every replay. Plain values; aggregate across readers with `merge`/`+=`.
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformCounters {
    /// Transform steps run, including the final (possibly empty) one.
    pub chunks_transformed: u64,
    /// Raw bytes pulled from the source.
    pub bytes_consumed: u64,
    /// Bytes the transform produced into its output buffer.
    pub bytes_produced: u64,
    /// Seeks that rewound the source and replayed from the start.
    pub replays: u64,
}

impl TransformCounters {
    /// Record one transform step.
    pub fn add_chunk(&mut self, consumed: usize, produced: usize) {
        self.chunks_transformed += 1;
        self.bytes_consumed += consumed as u64;
        self.bytes_produced += produced as u64;
    }

    pub fn add_replay(&mut self) {
        self.replays += 1;
    }

    pub fn merge(&mut self, other: &TransformCounters) {
        self.chunks_transformed += other.chunks_transformed;
        self.bytes_consumed += other.bytes_consumed;
        self.bytes_produced += other.bytes_produced;
        self.replays += other.replays;
    }
}

impl AddAssign for TransformCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
