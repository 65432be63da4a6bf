//! Input and output envelopes of the segmenter stage

use serde::{Deserialize, Serialize};

use crate::types::{
    BoundaryCue, MediaSample, Scte35Event, SegmentRecord, StreamMetadata, TextSample,
};

/// One unit pushed into a pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamData {
    StreamInfo(StreamMetadata),
    TextSample(TextSample),
    CueEvent(BoundaryCue),
    MediaSample(MediaSample),
    SegmentInfo(SegmentRecord),
    Scte35Event(Scte35Event),
}

impl StreamData {
    /// Short name of the data kind, used in logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            StreamData::StreamInfo(_) => "stream_info",
            StreamData::TextSample(_) => "text_sample",
            StreamData::CueEvent(_) => "cue_event",
            StreamData::MediaSample(_) => "media_sample",
            StreamData::SegmentInfo(_) => "segment_info",
            StreamData::Scte35Event(_) => "scte35_event",
        }
    }
}

/// One unit emitted by the segmenter, in dispatch order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmenterOutput {
    StreamInfo(StreamMetadata),
    /// A buffered cue that is active during segment `segment_number`
    TextSample {
        segment_number: u64,
        sample: TextSample,
    },
    SegmentInfo(SegmentRecord),
    CueEvent(BoundaryCue),
    EndOfStream,
}

impl SegmenterOutput {
    pub fn as_segment(&self) -> Option<&SegmentRecord> {
        match self {
            SegmenterOutput::SegmentInfo(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_text_sample(&self) -> Option<(u64, &TextSample)> {
        match self {
            SegmenterOutput::TextSample {
                segment_number,
                sample,
            } => Some((*segment_number, sample)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextSampleRole;

    #[test]
    fn test_stream_data_tagged_json() {
        let data: StreamData = serde_json::from_str(
            r#"{"type": "text_sample", "start_time": 100, "duration": 20, "role": "cue"}"#,
        )
        .unwrap();
        match data {
            StreamData::TextSample(sample) => {
                assert_eq!(sample.start_time, 100);
                assert_eq!(sample.role, TextSampleRole::Cue);
            }
            other => panic!("unexpected {:?}", other),
        }

        let data: StreamData =
            serde_json::from_str(r#"{"type": "cue_event", "time_in_seconds": 12.5}"#).unwrap();
        assert_eq!(data.kind(), "cue_event");
    }

    #[test]
    fn test_output_json_shape() {
        let out = SegmenterOutput::SegmentInfo(SegmentRecord {
            start_timestamp: 0,
            duration: 6000,
            segment_number: 1,
        });
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["type"], "segment_info");
        assert_eq!(value["duration"], 6000);

        let value = serde_json::to_value(SegmenterOutput::EndOfStream).unwrap();
        assert_eq!(value["type"], "end_of_stream");
    }
}
