//! Downstream side of the segmenter

use crate::error::Result;
use crate::stream_data::SegmenterOutput;

/// Receiver for everything the segmenter emits.
///
/// Outputs arrive in dispatch order and must not be reordered. An error
/// returned here stops the segmenter immediately.
pub trait SegmentSink {
    fn dispatch(&mut self, output: SegmenterOutput) -> Result<()>;
}

impl SegmentSink for Vec<SegmenterOutput> {
    fn dispatch(&mut self, output: SegmenterOutput) -> Result<()> {
        self.push(output);
        Ok(())
    }
}

impl<S: SegmentSink + ?Sized> SegmentSink for &mut S {
    fn dispatch(&mut self, output: SegmenterOutput) -> Result<()> {
        (**self).dispatch(output)
    }
}

/// Sink that keeps every output in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    outputs: Vec<SegmenterOutput>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outputs(&self) -> &[SegmenterOutput] {
        &self.outputs
    }

    /// Drain what has been collected so far
    pub fn take(&mut self) -> Vec<SegmenterOutput> {
        std::mem::take(&mut self.outputs)
    }

    pub fn segments(&self) -> impl Iterator<Item = &crate::types::SegmentRecord> {
        self.outputs.iter().filter_map(SegmenterOutput::as_segment)
    }
}

impl SegmentSink for CollectingSink {
    fn dispatch(&mut self, output: SegmenterOutput) -> Result<()> {
        self.outputs.push(output);
        Ok(())
    }
}
