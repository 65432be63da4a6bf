//! Stream data types flowing through the text segmenter
//!
//! All times inside a stream are integer ticks scaled by the stream's
//! `time_scale`; only boundary cues are expressed in seconds.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SegmenterError};

/// Per-stream metadata, supplied once before any sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMetadata {
    /// Ticks per second for every timestamp in the stream
    pub time_scale: u32,
    /// Remaining metadata (codec, language, ...), passed through untouched
    #[serde(default, flatten)]
    pub attributes: Map<String, Value>,
}

impl StreamMetadata {
    pub fn new(time_scale: u32) -> Self {
        Self {
            time_scale,
            attributes: Map::new(),
        }
    }
}

/// What a text sample means to the segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSampleRole {
    /// Start of a caption; the only role that gets buffered
    Cue,
    /// Closes the open cue(s) on the same sub-stream
    CueEnd,
    /// Timing tick derived from the media streams
    MediaHeartbeat,
    /// Timing tick derived from the text stream
    TextHeartbeat,
    #[serde(other)]
    Unknown,
}

impl TextSampleRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextSampleRole::Cue => "cue",
            TextSampleRole::CueEnd => "cue_end",
            TextSampleRole::MediaHeartbeat => "media_heartbeat",
            TextSampleRole::TextHeartbeat => "text_heartbeat",
            TextSampleRole::Unknown => "unknown",
        }
    }
}

/// One caption unit or timing trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSample {
    #[serde(default)]
    pub id: String,
    /// Start time in ticks
    pub start_time: i64,
    /// Duration in ticks
    #[serde(default)]
    pub duration: i64,
    pub role: TextSampleRole,
    /// Logical sub-channel used to pair a cue with its cue end
    #[serde(default)]
    pub sub_stream_index: i64,
    /// Opaque body, never inspected
    #[serde(default)]
    pub payload: Bytes,
}

impl TextSample {
    pub fn new(role: TextSampleRole, start_time: i64, duration: i64) -> Self {
        Self {
            id: String::new(),
            start_time,
            duration,
            role,
            sub_stream_index: 0,
            payload: Bytes::new(),
        }
    }

    pub fn with_sub_stream(mut self, sub_stream_index: i64) -> Self {
        self.sub_stream_index = sub_stream_index;
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// End time in ticks; `None` when it lies outside the `i64` range
    pub fn end_time(&self) -> Option<i64> {
        self.start_time.checked_add(self.duration)
    }

    /// Stretch the sample so it ends at `end_time`, keeping its start
    pub fn set_end_time(&mut self, end_time: i64) -> Result<()> {
        self.duration = end_time.checked_sub(self.start_time).ok_or_else(|| {
            SegmenterError::InvalidState(format!(
                "end time {} is out of range for a sample starting at {}",
                end_time, self.start_time
            ))
        })?;
        Ok(())
    }
}

/// Externally triggered segment boundary (ad insertion point)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCue {
    pub time_in_seconds: f64,
    #[serde(default)]
    pub cue_data: String,
}

impl BoundaryCue {
    pub fn new(time_in_seconds: f64) -> Self {
        Self {
            time_in_seconds,
            cue_data: String::new(),
        }
    }
}

/// Emitted once per finalized segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    /// Segment start in ticks
    pub start_timestamp: i64,
    /// Segment length in ticks, always positive
    pub duration: i64,
    pub segment_number: u64,
}

impl SegmentRecord {
    pub fn end_timestamp(&self) -> i64 {
        self.start_timestamp + self.duration
    }
}

/// Audio/video sample travelling through the same pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSample {
    pub pts: i64,
    pub dts: i64,
    pub duration: i64,
    #[serde(default)]
    pub is_key_frame: bool,
    #[serde(default)]
    pub data: Bytes,
}

/// Raw SCTE-35 splice event, before it is turned into a boundary cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scte35Event {
    #[serde(default)]
    pub id: String,
    pub start_time_in_seconds: f64,
    #[serde(default)]
    pub duration_in_seconds: f64,
    #[serde(default)]
    pub cue_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_time() {
        let sample = TextSample::new(TextSampleRole::Cue, 5000, 200);
        assert_eq!(sample.end_time(), Some(5200));

        let sample = TextSample::new(TextSampleRole::Cue, i64::MAX - 10, 11);
        assert_eq!(sample.end_time(), None);
    }

    #[test]
    fn test_set_end_time_keeps_start() {
        let mut sample = TextSample::new(TextSampleRole::Cue, 5000, 200);
        sample.set_end_time(12000).unwrap();
        assert_eq!(sample.start_time, 5000);
        assert_eq!(sample.duration, 7000);
        assert_eq!(sample.end_time(), Some(12000));
    }

    #[test]
    fn test_set_end_time_out_of_range() {
        let mut sample = TextSample::new(TextSampleRole::Cue, -10, 200);
        let err = sample.set_end_time(i64::MAX).unwrap_err();
        assert!(err.is_contract_violation());
        assert_eq!(sample.duration, 200);
    }

    #[test]
    fn test_role_deserialize() {
        let role: TextSampleRole = serde_json::from_str("\"cue_end\"").unwrap();
        assert_eq!(role, TextSampleRole::CueEnd);
        let role: TextSampleRole = serde_json::from_str("\"something_new\"").unwrap();
        assert_eq!(role, TextSampleRole::Unknown);
    }

    #[test]
    fn test_metadata_keeps_unknown_fields() {
        let meta: StreamMetadata =
            serde_json::from_str(r#"{"time_scale": 90000, "language": "nl"}"#).unwrap();
        assert_eq!(meta.time_scale, 90000);
        assert_eq!(meta.attributes.get("language"), Some(&Value::from("nl")));

        let out = serde_json::to_value(&meta).unwrap();
        assert_eq!(out["language"], "nl");
    }

    #[test]
    fn test_sample_payload_from_string() {
        let sample: TextSample = serde_json::from_str(
            r#"{"start_time": 10, "duration": 5, "role": "cue", "payload": "Hello"}"#,
        )
        .unwrap();
        assert_eq!(&sample.payload[..], b"Hello");
        assert_eq!(sample.sub_stream_index, 0);
    }

    #[test]
    fn test_segment_end_timestamp() {
        let record = SegmentRecord {
            start_timestamp: 10000,
            duration: 4000,
            segment_number: 2,
        };
        assert_eq!(record.end_timestamp(), 14000);
    }
}
