//! Streaming text segmenter for HLS packaging
//!
//! Partitions a timed caption stream into fixed-duration segments, cuts
//! segments short at ad-insertion cue events and keeps long cues alive in
//! every segment they overlap.

pub mod config;
pub mod config_file;
pub mod error;
pub mod feed;
pub mod logging;
pub mod segment;
pub mod stream_data;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use config::{AppConfig, LoggingConfig, SegmenterConfig};
pub use error::{Result, SegmenterError};
pub use segment::{CollectingSink, SegmentSink, SegmenterState, SegmenterStats, TextSegmenter};
pub use stream_data::{SegmenterOutput, StreamData};
pub use types::{
    BoundaryCue, MediaSample, Scte35Event, SegmentRecord, StreamMetadata, TextSample,
    TextSampleRole,
};
