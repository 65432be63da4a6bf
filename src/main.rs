//! HLS text segmenter
//!
//! Reads JSON-lines text stream feeds, cuts them into segments and writes the
//! segmenter output as JSON lines. Every feed gets its own segmenter on its
//! own thread.

use clap::Parser;
use std::collections::HashSet;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use hls_text_segmenter::config::{AppConfig, SegmenterConfig};
use hls_text_segmenter::config_file::{generate_default_config, ConfigFile};
use hls_text_segmenter::feed::{
    create_output, open_input, output_path, run_feed, FeedSummary, JsonLinesSink,
};
use hls_text_segmenter::logging::init_logging;
use hls_text_segmenter::{Result, SegmenterError};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "hls-text-segmenter";

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_PATH: &str = "hls-text-segmenter.toml";

#[derive(Parser, Debug, Clone)]
#[command(name = "hls-text-segmenter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines feeds to segment ("-" reads stdin)
    #[arg(required_unless_present = "write_default_config")]
    inputs: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Segment duration in seconds (overrides the config file)
    #[arg(short = 'd', long)]
    segment_duration: Option<f64>,

    /// Number of the first segment (overrides the config file)
    #[arg(short = 'n', long)]
    start_segment_number: Option<u64>,

    /// Directory for `<input>.segments.jsonl` files; stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log as JSON
    #[arg(long)]
    json_logs: bool,

    /// Write a default configuration file and exit
    #[arg(long, value_name = "FILE")]
    write_default_config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        return match generate_default_config(path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}: {}", APP_NAME, e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", APP_NAME, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}: {}", APP_NAME, e);
        return ExitCode::FAILURE;
    }

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    tracing::info!("Configuration loaded: {:?}", config);

    match run(&args.inputs, &config.segment, args.output.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Config file (explicit or default location), then command line overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigFile::from_file(path)?.into_app_config(),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            match ConfigFile::from_file(DEFAULT_CONFIG_PATH) {
                Ok(cf) => cf.into_app_config(),
                Err(e) => {
                    eprintln!(
                        "{}: failed to load config file {}: {}. Using defaults.",
                        APP_NAME, DEFAULT_CONFIG_PATH, e
                    );
                    AppConfig::default()
                }
            }
        }
        None => AppConfig::default(),
    };

    if let Some(secs) = args.segment_duration {
        config.segment.segment_duration_secs = secs;
    }
    if let Some(number) = args.start_segment_number {
        config.segment.start_segment_number = number;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }

    config.validate()?;
    Ok(config)
}

fn run(inputs: &[PathBuf], segment: &SegmenterConfig, output_dir: Option<&Path>) -> Result<()> {
    match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let mut seen = HashSet::new();
            for input in inputs {
                let path = output_path(dir, input);
                if !seen.insert(path.clone()) {
                    return Err(SegmenterError::Config(format!(
                        "two inputs would both write {}",
                        path.display()
                    )));
                }
            }
        }
        None if inputs.len() > 1 => {
            return Err(SegmenterError::Config(
                "more than one input needs --output".to_string(),
            ));
        }
        None => {}
    }

    // Segmenters share nothing, so each feed runs on its own thread.
    let results: Vec<Result<FeedSummary>> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| scope.spawn(move || segment_feed(input, segment, output_dir)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    Err(SegmenterError::InvalidState(
                        "feed worker panicked".to_string(),
                    ))
                })
            })
            .collect()
    });

    let mut first_error = None;
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(summary) => tracing::info!(
                input = %input.display(),
                segments = summary.stats.segments_dispatched,
                samples = summary.stats.samples_forwarded,
                skipped = summary.skipped_inputs,
                lines = summary.lines_read,
                "feed done"
            ),
            Err(e) => {
                tracing::error!(input = %input.display(), "feed failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn segment_feed(
    input: &Path,
    segment: &SegmenterConfig,
    output_dir: Option<&Path>,
) -> Result<FeedSummary> {
    let span = tracing::info_span!("feed", input = %input.display());
    let _enter = span.enter();

    let reader = open_input(input)?;
    match output_dir {
        Some(dir) => {
            let path = output_path(dir, input);
            let mut sink = JsonLinesSink::new(create_output(&path)?);
            let summary = run_feed(reader, segment, &mut sink)?;
            sink.flush()?;
            tracing::debug!(output = %path.display(), lines = sink.lines_written(), "output written");
            Ok(summary)
        }
        None => {
            let mut sink = JsonLinesSink::new(BufWriter::new(io::stdout().lock()));
            let summary = run_feed(reader, segment, &mut sink)?;
            sink.flush()?;
            Ok(summary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::parse_from([
            APP_NAME,
            "--segment-duration",
            "2.5",
            "-n",
            "40",
            "--json-logs",
            "feed.jsonl",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.segment.segment_duration_secs, 2.5);
        assert_eq!(config.segment.start_segment_number, 40);
        assert!(config.logging.is_json());
        assert_eq!(args.inputs, vec![PathBuf::from("feed.jsonl")]);
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let args = Args::parse_from([APP_NAME, "-d", "0", "feed.jsonl"]);
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_multiple_inputs_need_output_dir() {
        let inputs = vec![PathBuf::from("a.jsonl"), PathBuf::from("b.jsonl")];
        let err = run(&inputs, &SegmenterConfig::default(), None).unwrap_err();
        assert!(matches!(err, SegmenterError::Config(_)));
    }

    #[test]
    fn test_feeds_written_per_input() {
        let dir = tempfile::tempdir().unwrap();
        let feed = concat!(
            "{\"type\": \"stream_info\", \"time_scale\": 1000}\n",
            "{\"type\": \"text_sample\", \"start_time\": 0, \"duration\": 500, \"role\": \"cue\"}\n",
        );
        let a = dir.path().join("a.jsonl");
        let b = dir.path().join("b.jsonl");
        std::fs::write(&a, feed).unwrap();
        std::fs::write(&b, feed).unwrap();

        let out = dir.path().join("out");
        run(&[a, b], &SegmenterConfig::default(), Some(out.as_path())).unwrap();

        for name in ["a.segments.jsonl", "b.segments.jsonl"] {
            let text = std::fs::read_to_string(out.join(name)).unwrap();
            // stream info, forwarded cue, segment info, end of stream
            assert_eq!(text.lines().count(), 4);
        }
    }
}
