//! Per-stream segmenter counters

use serde::Serialize;

/// Counters for one segmenter instance.
///
/// The segmenter is single-threaded, so these are plain integers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmenterStats {
    /// Segments dispatched, shortened ones included
    pub segments_dispatched: u64,
    /// Segments cut short by a boundary cue
    pub shortened_segments: u64,
    /// Text samples forwarded downstream (a long cue counts once per segment)
    pub samples_forwarded: u64,
    pub cues_buffered: u64,
    /// Cues removed from the buffer once fully covered
    pub cues_pruned: u64,
    /// Buffered cues whose end time was reset by a cue end
    pub cue_ends_matched: u64,
    /// Non-cue samples consumed only for their timing
    pub transient_samples: u64,
}

impl SegmenterStats {
    /// Average number of forwarded samples per dispatched segment
    pub fn samples_per_segment(&self) -> f64 {
        if self.segments_dispatched == 0 {
            return 0.0;
        }
        self.samples_forwarded as f64 / self.segments_dispatched as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_per_segment() {
        let stats = SegmenterStats::default();
        assert_eq!(stats.samples_per_segment(), 0.0);

        let stats = SegmenterStats {
            segments_dispatched: 4,
            samples_forwarded: 6,
            ..Default::default()
        };
        assert_eq!(stats.samples_per_segment(), 1.5);
    }
}
