//! Scenario testing module
//!
//! Whole-stream tests for the text segmenter:
//! - Segment contiguity and numbering
//! - Cross-stream boundary alignment
//! - Boundary cue splicing
//! - Cue/cue-end correlation and long cue re-forwarding
//! - Flush and lifecycle

pub mod fixtures;
