//! Decode statistics, collected by the frame reader as a side effect
//! of pulling frames.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::blackbox::frame::{Frame, FrameError, FrameKind};

/// Counters for one frame kind.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FrameStats {
    pub valid_count: u64,
    pub desync_count: u64,
    pub corrupt_count: u64,
    pub bytes: u64,
    /// Frame size histogram: size in bytes -> occurrences.
    pub size_count: BTreeMap<u64, u64>,
}

/// Aggregate counters over a whole decode run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Stats {
    pub total_frames: u64,
    pub total_corrupted_frames: u64,
    /// Loop iterations the encoder skipped on purpose according to the
    /// I/P interval ratio.
    pub intentionally_absent_iterations: u64,
    pub total_bytes: u64,
    pub frame: BTreeMap<FrameKind, FrameStats>,
}

impl Stats {
    pub(crate) fn record_frame(&mut self, frame: &Frame) {
        self.total_frames += 1;
        self.total_bytes += frame.size();

        let entry = self.frame.entry(frame.kind()).or_default();
        entry.bytes += frame.size();
        *entry.size_count.entry(frame.size()).or_default() += 1;

        match frame.error() {
            None => entry.valid_count += 1,
            Some(FrameError::Desync { .. }) => {
                entry.desync_count += 1;
                self.total_corrupted_frames += 1;
            }
            Some(_) => {
                entry.corrupt_count += 1;
                self.total_corrupted_frames += 1;
            }
        }
    }

    pub(crate) fn record_skipped_iterations(&mut self, count: i32) {
        self.intentionally_absent_iterations += count.max(0) as u64;
    }
}
