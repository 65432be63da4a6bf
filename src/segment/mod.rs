//! Text segmentation module
//!
//! This module turns a timed text stream into HLS-sized segments:
//! - Fixed-duration segments aligned across streams
//! - Early segment ends at ad-insertion cue events
//! - Cue/cue-end correlation per sub-stream
//! - Re-forwarding of cues that span several segments

pub mod segmenter;
pub mod sink;
pub mod stats;

pub use segmenter::{SegmenterState, TextSegmenter};
pub use sink::{CollectingSink, SegmentSink};
pub use stats::SegmenterStats;
