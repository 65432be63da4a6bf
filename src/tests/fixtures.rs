//! Test fixtures for scenario tests
//!
//! Sample builders and a small harness that owns a segmenter together with
//! the sink collecting its output.

use crate::segment::{CollectingSink, TextSegmenter};
use crate::stream_data::SegmenterOutput;
use crate::types::{BoundaryCue, SegmentRecord, StreamMetadata, TextSample, TextSampleRole};

pub fn cue(start: i64, duration: i64) -> TextSample {
    TextSample::new(TextSampleRole::Cue, start, duration).with_payload(format!("cue@{}", start))
}

pub fn cue_on(sub_stream: i64, start: i64, duration: i64) -> TextSample {
    cue(start, duration).with_sub_stream(sub_stream)
}

pub fn cue_end(sub_stream: i64, start: i64, duration: i64) -> TextSample {
    TextSample::new(TextSampleRole::CueEnd, start, duration).with_sub_stream(sub_stream)
}

pub fn heartbeat(time: i64) -> TextSample {
    TextSample::new(TextSampleRole::MediaHeartbeat, time, 0)
}

/// Segmenter plus collected output
pub struct Harness {
    pub segmenter: TextSegmenter,
    pub sink: CollectingSink,
}

impl Harness {
    /// Initialized segmenter with the given segment length and time scale
    pub fn new(segment_secs: f64, time_scale: u32, start_segment_number: u64) -> Self {
        let mut segmenter = TextSegmenter::new(segment_secs, start_segment_number);
        let mut sink = CollectingSink::new();
        segmenter
            .on_stream_info(StreamMetadata::new(time_scale), &mut sink)
            .unwrap();
        sink.take();
        Self { segmenter, sink }
    }

    pub fn sample(&mut self, sample: TextSample) -> &mut Self {
        self.segmenter.on_text_sample(&sample, &mut self.sink).unwrap();
        self
    }

    pub fn boundary(&mut self, seconds: f64) -> &mut Self {
        self.segmenter
            .on_cue_event(BoundaryCue::new(seconds), &mut self.sink)
            .unwrap();
        self
    }

    pub fn flush(&mut self) -> &mut Self {
        self.segmenter.flush(&mut self.sink).unwrap();
        self
    }

    pub fn outputs(&self) -> &[SegmenterOutput] {
        self.sink.outputs()
    }

    pub fn segments(&self) -> Vec<SegmentRecord> {
        self.sink.segments().copied().collect()
    }

    /// (segment number, sample start) for every forwarded sample
    pub fn forwarded(&self) -> Vec<(u64, i64)> {
        self.outputs()
            .iter()
            .filter_map(SegmenterOutput::as_text_sample)
            .map(|(nr, sample)| (nr, sample.start_time))
            .collect()
    }

    /// (start, end) of every segment
    pub fn spans(&self) -> Vec<(i64, i64)> {
        self.segments()
            .iter()
            .map(|s| (s.start_timestamp, s.end_timestamp()))
            .collect()
    }
}
