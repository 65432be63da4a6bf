//! Text segmenter
//!
//! Cuts a stream of timed text samples into fixed-length segments. Segment
//! boundaries are aligned to multiples of the segment duration so that
//! independently timed streams end up with identical boundaries, and a
//! boundary cue (ad insertion point) cuts the running segment short.
//!
//! A cue is kept in the buffer until the segment start has moved past its end,
//! so a cue spanning several segments is forwarded once for every segment it
//! is active in.

use crate::config::SegmenterConfig;
use crate::error::{Result, SegmenterError};
use crate::segment::sink::SegmentSink;
use crate::segment::stats::SegmenterStats;
use crate::stream_data::{SegmenterOutput, StreamData};
use crate::types::{BoundaryCue, SegmentRecord, StreamMetadata, TextSample, TextSampleRole};

/// Lifecycle of a segmenter instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// Waiting for stream info
    Uninitialized,
    Active,
    /// Flushed; accepts nothing further
    Drained,
    /// Stopped by a contract violation or a sink error
    Failed,
}

/// Segmenter for one text stream
#[derive(Debug)]
pub struct TextSegmenter {
    segment_duration_secs: f64,
    state: SegmenterState,
    /// Ticks per second, set from stream info
    time_scale: u32,
    /// Segment length in ticks
    segment_duration: i64,
    /// Start of the open segment; `None` until the first sample or cue
    segment_start: Option<i64>,
    segment_number: u64,
    /// Owned cue copies, in arrival order
    samples_in_current_segment: Vec<TextSample>,
    stats: SegmenterStats,
}

impl TextSegmenter {
    pub fn new(segment_duration_secs: f64, start_segment_number: u64) -> Self {
        Self {
            segment_duration_secs,
            state: SegmenterState::Uninitialized,
            time_scale: 0,
            segment_duration: 0,
            segment_start: None,
            segment_number: start_segment_number,
            samples_in_current_segment: Vec::new(),
            stats: SegmenterStats::default(),
        }
    }

    pub fn from_config(config: &SegmenterConfig) -> Self {
        Self::new(config.segment_duration_secs, config.start_segment_number)
    }

    pub fn state(&self) -> SegmenterState {
        self.state
    }

    pub fn segment_duration_ticks(&self) -> i64 {
        self.segment_duration
    }

    pub fn segment_start(&self) -> Option<i64> {
        self.segment_start
    }

    /// Number the next dispatched segment will get
    pub fn next_segment_number(&self) -> u64 {
        self.segment_number
    }

    pub fn buffered_cue_count(&self) -> usize {
        self.samples_in_current_segment.len()
    }

    pub fn buffered_cues(&self) -> &[TextSample] {
        &self.samples_in_current_segment
    }

    pub fn stats(&self) -> &SegmenterStats {
        &self.stats
    }

    /// Route one unit of stream data to its handler.
    ///
    /// Kinds this stage does not handle are rejected without touching state;
    /// the caller decides whether to give up on the stream.
    pub fn process<S>(&mut self, data: StreamData, sink: &mut S) -> Result<()>
    where
        S: SegmentSink + ?Sized,
    {
        match data {
            StreamData::StreamInfo(info) => self.on_stream_info(info, sink),
            StreamData::TextSample(sample) => self.on_text_sample(&sample, sink),
            StreamData::CueEvent(event) => self.on_cue_event(event, sink),
            other @ (StreamData::MediaSample(_)
            | StreamData::SegmentInfo(_)
            | StreamData::Scte35Event(_)) => Err(SegmenterError::UnsupportedInput(format!(
                "invalid stream data type {} for the text segmenter",
                other.kind()
            ))),
        }
    }

    /// Take the stream's time scale and pass the metadata on.
    pub fn on_stream_info<S>(&mut self, info: StreamMetadata, sink: &mut S) -> Result<()>
    where
        S: SegmentSink + ?Sized,
    {
        if self.state != SegmenterState::Uninitialized {
            return Err(SegmenterError::InvalidState(format!(
                "stream info received in state {:?}",
                self.state
            )));
        }
        let result = self.handle_stream_info(info, sink);
        self.fail_on_error(result)
    }

    /// Feed one text sample.
    ///
    /// Cues are copied into the buffer; every other role only moves the
    /// segment clock forward.
    pub fn on_text_sample<S>(&mut self, sample: &TextSample, sink: &mut S) -> Result<()>
    where
        S: SegmentSink + ?Sized,
    {
        self.ensure_active("text sample")?;
        let result = self.handle_text_sample(sample, sink);
        self.fail_on_error(result)
    }

    /// End the open segment early at the cue's time and pass the cue on.
    pub fn on_cue_event<S>(&mut self, event: BoundaryCue, sink: &mut S) -> Result<()>
    where
        S: SegmentSink + ?Sized,
    {
        self.ensure_active("cue event")?;
        let result = self.handle_cue_event(event, sink);
        self.fail_on_error(result)
    }

    /// Dispatch segments until every buffered cue has been covered, then
    /// signal end of stream. The instance is drained afterwards.
    pub fn flush<S>(&mut self, sink: &mut S) -> Result<()>
    where
        S: SegmentSink + ?Sized,
    {
        self.ensure_active("flush")?;
        let result = self.handle_flush(sink);
        self.fail_on_error(result)
    }

    fn handle_stream_info<S>(&mut self, info: StreamMetadata, sink: &mut S) -> Result<()>
    where
        S: SegmentSink + ?Sized,
    {
        if info.time_scale == 0 {
            return Err(SegmenterError::InvalidState(
                "need a positive time scale to scale time".to_string(),
            ));
        }
        self.time_scale = info.time_scale;

        let segment_duration = self.scale_time(self.segment_duration_secs);
        if segment_duration <= 0 {
            return Err(SegmenterError::InvalidState(format!(
                "segment duration of {}s is {} ticks at time scale {}",
                self.segment_duration_secs, segment_duration, self.time_scale
            )));
        }
        self.segment_duration = segment_duration;
        self.state = SegmenterState::Active;

        tracing::debug!(
            time_scale = self.time_scale,
            segment_duration,
            "text segmenter initialized"
        );

        sink.dispatch(SegmenterOutput::StreamInfo(info))
    }

    fn handle_text_sample<S>(&mut self, sample: &TextSample, sink: &mut S) -> Result<()>
    where
        S: SegmentSink + ?Sized,
    {
        let sample_start = sample.start_time;
        let role = sample.role;
        let sample_end = sample.end_time().ok_or_else(|| {
            SegmenterError::InvalidState(format!(
                "{} sample at {} with duration {} ends outside the tick range",
                role.as_str(),
                sample_start,
                sample.duration
            ))
        })?;

        match role {
            TextSampleRole::Cue => tracing::debug!(pts = sample_start, "cue sample started"),
            TextSampleRole::CueEnd => tracing::debug!(pts = sample_end, "cue end sample"),
            TextSampleRole::MediaHeartbeat => {
                tracing::debug!(pts = sample_start, "media heartbeat")
            }
            TextSampleRole::TextHeartbeat => tracing::debug!(pts = sample_start, "text heartbeat"),
            TextSampleRole::Unknown => {
                tracing::warn!(pts = sample_start, "unknown text sample role")
            }
        }

        // Base all segments on the segment that would have held the first sample.
        if self.segment_start.is_none() {
            let start = self.align_to_segment(sample_start)?;
            tracing::info!(first_segment_start = start, "first text segment start");
            self.segment_start = Some(start);
        }

        if role == TextSampleRole::CueEnd {
            for cue in self
                .samples_in_current_segment
                .iter_mut()
                .filter(|s| s.role == TextSampleRole::Cue)
                .filter(|s| s.sub_stream_index == sample.sub_stream_index)
            {
                cue.set_end_time(sample_end)?;
                self.stats.cue_ends_matched += 1;
                tracing::debug!(
                    pts = cue.start_time,
                    duration = cue.duration,
                    sub_stream = cue.sub_stream_index,
                    "reset cue duration"
                );
            }
        }

        // Close every segment that ends at or before the new sample's start.
        while sample_start >= self.segment_end(self.segment_duration)? {
            self.dispatch_segment(self.segment_duration, sink)?;
        }

        if role == TextSampleRole::Cue {
            self.samples_in_current_segment.push(sample.clone());
            self.stats.cues_buffered += 1;
        } else {
            self.stats.transient_samples += 1;
        }

        Ok(())
    }

    fn handle_cue_event<S>(&mut self, event: BoundaryCue, sink: &mut S) -> Result<()>
    where
        S: SegmentSink + ?Sized,
    {
        if !event.time_in_seconds.is_finite() {
            return Err(SegmenterError::InvalidState(format!(
                "cue event time {} is not a finite number of seconds",
                event.time_in_seconds
            )));
        }

        // Upstream inserts the cue so that no later sample starts before it.
        let event_time = self.scale_time(event.time_in_seconds);

        let mut starts_at_event = false;
        if self.segment_start.is_none() {
            let start = self.align_to_segment(event_time)?;
            tracing::info!(
                first_segment_start = start,
                "first text segment start taken from cue event"
            );
            self.segment_start = Some(start);
            starts_at_event = start == event_time;
        }

        // Output all full segments before the one the cue interrupts.
        while self.segment_end(self.segment_duration)? < event_time {
            self.dispatch_segment(self.segment_duration, sink)?;
        }

        if starts_at_event {
            tracing::debug!(event_time, "cue event on the first segment boundary");
        } else {
            let segment_start = self.current_segment_start()?;
            let shortened = event_time.checked_sub(segment_start).ok_or_else(|| {
                SegmenterError::InvalidState(format!(
                    "cue event at {} is out of range for the segment starting at {}",
                    event_time, segment_start
                ))
            })?;
            self.dispatch_segment(shortened, sink)?;
            if shortened < self.segment_duration {
                self.stats.shortened_segments += 1;
            }
        }

        tracing::debug!(event_time, cue_data = %event.cue_data, "forwarding cue event");
        sink.dispatch(SegmenterOutput::CueEvent(event))
    }

    fn handle_flush<S>(&mut self, sink: &mut S) -> Result<()>
    where
        S: SegmentSink + ?Sized,
    {
        // Each dispatch prunes the cues it fully covers.
        while !self.samples_in_current_segment.is_empty() {
            self.dispatch_segment(self.segment_duration, sink)?;
        }

        sink.dispatch(SegmenterOutput::EndOfStream)?;
        self.state = SegmenterState::Drained;

        tracing::info!(
            segments = self.stats.segments_dispatched,
            shortened = self.stats.shortened_segments,
            samples_forwarded = self.stats.samples_forwarded,
            samples_per_segment = self.stats.samples_per_segment(),
            cues = self.stats.cues_buffered,
            "text segmenter drained"
        );
        Ok(())
    }

    fn dispatch_segment<S>(&mut self, duration: i64, sink: &mut S) -> Result<()>
    where
        S: SegmentSink + ?Sized,
    {
        if duration <= 0 {
            return Err(SegmenterError::InvalidState(format!(
                "segment duration should always be positive, got {}",
                duration
            )));
        }
        let segment_start = self.current_segment_start()?;
        let new_segment_start = self.segment_end(duration)?;

        for sample in &self.samples_in_current_segment {
            tracing::trace!(
                pts = sample.start_time,
                duration = sample.duration,
                role = sample.role.as_str(),
                "dispatch text sample"
            );
            sink.dispatch(SegmenterOutput::TextSample {
                segment_number: self.segment_number,
                sample: sample.clone(),
            })?;
            self.stats.samples_forwarded += 1;
        }

        let record = SegmentRecord {
            start_timestamp: segment_start,
            duration,
            segment_number: self.segment_number,
        };
        self.segment_number += 1;
        self.stats.segments_dispatched += 1;

        tracing::debug!(
            nr = record.segment_number,
            start = record.start_timestamp,
            end = record.end_timestamp(),
            "dispatch segment info"
        );
        sink.dispatch(SegmenterOutput::SegmentInfo(record))?;

        self.segment_start = Some(new_segment_start);

        // Drop cues that ended before the new segment started.
        let before = self.samples_in_current_segment.len();
        self.samples_in_current_segment
            .retain(|sample| sample.end_time().map_or(true, |end| end > new_segment_start));
        let pruned = before - self.samples_in_current_segment.len();
        self.stats.cues_pruned += pruned as u64;

        if pruned > 0 {
            tracing::debug!(
                pruned,
                remaining = self.samples_in_current_segment.len(),
                segment_start = new_segment_start,
                "pruned covered cues"
            );
        }
        Ok(())
    }

    fn ensure_active(&self, what: &str) -> Result<()> {
        match self.state {
            SegmenterState::Active => Ok(()),
            SegmenterState::Uninitialized => Err(SegmenterError::InvalidState(format!(
                "{} received before stream info",
                what
            ))),
            SegmenterState::Drained => Err(SegmenterError::InvalidState(format!(
                "{} received after flush",
                what
            ))),
            SegmenterState::Failed => Err(SegmenterError::InvalidState(format!(
                "{} received after the stream failed",
                what
            ))),
        }
    }

    fn fail_on_error(&mut self, result: Result<()>) -> Result<()> {
        if let Err(e) = &result {
            tracing::error!(error = %e, "text segmenter stopped");
            self.state = SegmenterState::Failed;
        }
        result
    }

    fn current_segment_start(&self) -> Result<i64> {
        self.segment_start.ok_or_else(|| {
            SegmenterError::InvalidState("segment start is not known yet".to_string())
        })
    }

    /// End of the open segment if it runs for `duration` ticks.
    fn segment_end(&self, duration: i64) -> Result<i64> {
        let segment_start = self.current_segment_start()?;
        segment_start.checked_add(duration).ok_or_else(|| {
            SegmenterError::InvalidState(format!(
                "segment at {} with duration {} ends outside the tick range",
                segment_start, duration
            ))
        })
    }

    /// Start of the segment that contains `time`.
    fn align_to_segment(&self, time: i64) -> Result<i64> {
        time.div_euclid(self.segment_duration)
            .checked_mul(self.segment_duration)
            .ok_or_else(|| {
                SegmenterError::InvalidState(format!("time {} has no segment boundary in range", time))
            })
    }

    /// Seconds to ticks, truncating toward zero.
    fn scale_time(&self, seconds: f64) -> i64 {
        (seconds * self.time_scale as f64) as i64
    }
}
