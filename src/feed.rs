//! JSON-lines feeds
//!
//! A feed is one `StreamData` JSON object per line. Blank lines and lines
//! starting with `#` are skipped. Output is written the same way, one
//! `SegmenterOutput` per line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::SegmenterConfig;
use crate::error::{Result, SegmenterError};
use crate::segment::{SegmentSink, SegmenterStats, TextSegmenter};
use crate::stream_data::{SegmenterOutput, StreamData};

/// Reads `StreamData` from a JSON-lines source
pub struct FeedReader<R> {
    reader: R,
    line_number: usize,
    buf: String,
}

impl<R: BufRead> FeedReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buf: String::new(),
        }
    }

    /// Line number of the last line read
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for FeedReader<R> {
    type Item = Result<StreamData>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_number += 1;

            let line = self.buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Some(serde_json::from_str(line).map_err(|e| SegmenterError::Feed {
                line: self.line_number,
                message: e.to_string(),
            }));
        }
    }
}

/// Writes every output as one JSON line
pub struct JsonLinesSink<W: Write> {
    writer: W,
    lines: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    pub fn lines_written(&self) -> usize {
        self.lines
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SegmentSink for JsonLinesSink<W> {
    fn dispatch(&mut self, output: SegmenterOutput) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &output)
            .map_err(|e| SegmenterError::Sink(e.to_string()))?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }
}

/// Outcome of running one feed to completion
#[derive(Debug, Clone, Default)]
pub struct FeedSummary {
    pub stats: SegmenterStats,
    /// Inputs of a kind the segmenter does not handle
    pub skipped_inputs: usize,
    pub lines_read: usize,
}

/// Drive one segmenter over a whole feed and flush it at end of input.
///
/// Unsupported data kinds are logged and skipped; every other error stops
/// the feed.
pub fn run_feed<R, S>(input: R, config: &SegmenterConfig, sink: &mut S) -> Result<FeedSummary>
where
    R: BufRead,
    S: SegmentSink + ?Sized,
{
    let mut segmenter = TextSegmenter::from_config(config);
    let mut reader = FeedReader::new(input);
    let mut skipped_inputs = 0;

    while let Some(data) = reader.next() {
        let data = data?;
        match segmenter.process(data, sink) {
            Ok(()) => {}
            Err(SegmenterError::UnsupportedInput(message)) => {
                tracing::warn!(line = reader.line_number(), "skipping input: {}", message);
                skipped_inputs += 1;
            }
            Err(e) => {
                tracing::error!(line = reader.line_number(), "feed stopped: {}", e);
                return Err(e);
            }
        }
    }

    segmenter.flush(sink)?;

    Ok(FeedSummary {
        stats: segmenter.stats().clone(),
        skipped_inputs,
        lines_read: reader.line_number(),
    })
}

/// Open a feed file, or stdin for `-`
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path)?;
    Ok(Box::new(BufReader::new(file)))
}

/// Create a buffered output file
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// `DIR/<stem>.segments.jsonl` for an input feed
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && *s != "-")
        .unwrap_or("stdin");
    output_dir.join(format!("{}.segments.jsonl", stem))
}
