mod cli;

use flacseek::config::{self, Config};
use flacseek::report::{self, SeekReport, SeekTableReport, StreamReport, TableSource};
use flacseek_frame::ChannelAssignment;
use flacseek_stream::{ParseFailure, Stream, StreamBuilder};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Origin};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Validate reports config errors itself; everything else needs a config up front.
    let config = match cli.command {
        Commands::Validate { .. } | Commands::Version => Config::default(),
        _ => config::load_config_or_default(cli.config.as_deref())?,
    };

    // Respect RUST_LOG env var if set, otherwise use the verbose or configured filter
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "flacseek=trace,flacseek_stream=trace".to_string()
        } else {
            config.logging.filter.clone()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    for warning in config::config_warnings(&config) {
        tracing::warn!("{}", warning);
    }

    match cli.command {
        Commands::Info { file, json } => show_info(&file, &config, json),
        Commands::Frames { file, limit } => list_frames(&file, &config, limit),
        Commands::SeekTable { file, json, size } => show_seek_table(&file, &config, size, json),
        Commands::Seek {
            file,
            sample,
            from,
            size,
            json,
        } => seek_file(&file, &config, sample, from, size, json),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("flacseek {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_file(path: &Path) -> Result<BufReader<File>> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {:?}", path);
    }
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    Ok(BufReader::new(file))
}

fn session_builder(config: &Config, size: Option<usize>) -> Result<StreamBuilder> {
    let builder = config.stream.builder();
    match size {
        Some(size) if size > config::MAX_SEEK_TABLE_SIZE => anyhow::bail!(
            "Seek table size {} exceeds the maximum of {}",
            size,
            config::MAX_SEEK_TABLE_SIZE
        ),
        Some(size) => Ok(builder.seek_table_size(size)),
        None => Ok(builder),
    }
}

fn open_stream(path: &Path, config: &Config) -> Result<Stream<BufReader<File>>> {
    let reader = open_file(path)?;
    tracing::debug!("Parsing {:?}", path);
    config
        .stream
        .builder()
        .build(reader)
        .map_err(ParseFailure::into_error)
        .with_context(|| format!("Failed to parse FLAC stream: {:?}", path))
}

fn open_seekable_stream(
    path: &Path,
    config: &Config,
    size: Option<usize>,
) -> Result<Stream<BufReader<File>>> {
    let builder = session_builder(config, size)?;
    let reader = open_file(path)?;
    tracing::debug!("Parsing {:?} for seeking", path);
    builder
        .build_seekable(reader)
        .map_err(ParseFailure::into_error)
        .with_context(|| format!("Failed to parse FLAC stream: {:?}", path))
}

fn channel_label(channels: ChannelAssignment) -> String {
    match channels {
        ChannelAssignment::Independent(n) => format!("{}ch", n),
        ChannelAssignment::LeftSide => "left/side".to_string(),
        ChannelAssignment::SideRight => "side/right".to_string(),
        ChannelAssignment::MidSide => "mid/side".to_string(),
    }
}

fn show_info(file: &Path, config: &Config, json: bool) -> Result<()> {
    let stream = open_stream(file, config)?;
    let report = StreamReport::new(file, &stream);

    if json {
        let json_str = serde_json::to_string_pretty(&report)?;
        println!("{}", json_str);
        return Ok(());
    }

    let info = &report.info;
    println!("File: {}", report.path.display());
    println!("Sample rate: {} Hz", info.sample_rate);
    println!("Channels: {}", info.channels);
    println!("Bits per sample: {}", info.bits_per_sample);
    println!(
        "Block size: {}-{} samples",
        info.min_block_size, info.max_block_size
    );
    if info.has_total_samples() {
        println!("Total samples: {}", info.total_samples);
    } else {
        println!("Total samples: unknown");
    }
    if let Some(duration) = report::duration(info) {
        println!("Duration: {}", report::format_duration(duration));
    }
    if let Some(size) = report.id3_tag_size {
        println!("ID3v2 tag: {} bytes", size);
    }
    println!("Audio data starts at byte {}", report.data_start);

    println!("\nMetadata blocks: {}", report.blocks.len());
    for (i, block) in report.blocks.iter().enumerate() {
        print!("  [{}] {} ({} bytes)", i, block.block_type, block.length);
        if block.is_last {
            print!(" [last]");
        }
        println!();
    }

    Ok(())
}

fn list_frames(file: &Path, config: &Config, limit: Option<usize>) -> Result<()> {
    let mut stream = open_stream(file, config)?;
    let nominal = stream.info().max_block_size;
    let data_start = stream.data_start();

    let mut count = 0usize;
    while limit.map_or(true, |limit| count < limit) {
        let offset = stream.position() - data_start;
        let frame = stream
            .next_frame()
            .with_context(|| format!("Failed to read frame {} at offset {}", count, offset))?;
        let Some(frame) = frame else {
            break;
        };

        let header = &frame.header;
        println!(
            "{:>6}  offset {:>10}  sample {:>12}  {:>5} samples  {:<10}  {} bit",
            count,
            offset,
            header.first_sample(nominal),
            header.block_size,
            channel_label(header.channels),
            header.bits_per_sample
        );
        count += 1;
    }

    println!("\n{} frames", count);
    Ok(())
}

fn show_seek_table(file: &Path, config: &Config, size: Option<usize>, json: bool) -> Result<()> {
    let mut stream = open_seekable_stream(file, config, size)?;
    let source = if stream.seek_index().is_some() {
        TableSource::Embedded
    } else {
        TableSource::Synthesized
    };
    let index = stream.seek_table().context("Failed to build seek table")?;
    let report = SeekTableReport::new(source, index);

    if json {
        let json_str = serde_json::to_string_pretty(&report)?;
        println!("{}", json_str);
        return Ok(());
    }

    let label = match report.source {
        TableSource::Embedded => "embedded",
        TableSource::Synthesized => "synthesized",
    };
    println!("Seek table ({}): {} points", label, report.points.len());
    for (i, point) in report.points.iter().enumerate() {
        println!(
            "  [{}] sample {:>12}  offset {:>10}  {} samples",
            i, point.sample_number, point.offset, point.frame_samples
        );
    }

    Ok(())
}

fn seek_file(
    file: &Path,
    config: &Config,
    sample: i64,
    from: Origin,
    size: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut stream = open_seekable_stream(file, config, size)?;
    let origin = from.into();
    let achieved = stream
        .seek(sample, origin)
        .with_context(|| format!("Failed to seek to sample {}", sample))?;
    let position = stream.position();
    let frame = stream
        .next_header()
        .context("Failed to read frame header after seek")?;
    let report = SeekReport::new(sample, origin, achieved, position, frame);

    if json {
        let json_str = serde_json::to_string_pretty(&report)?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("Target: {} from {}", report.target, report.origin);
    println!("Reached sample: {}", report.achieved_sample);
    println!("Byte position: {}", report.position);
    match report.frame {
        Some(ref header) => println!(
            "Frame: {} samples, {}, {} bit",
            header.block_size,
            channel_label(header.channels),
            header.bits_per_sample
        ),
        None => println!("Frame: end of stream"),
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            for warning in config::config_warnings(&config) {
                println!("  Warning: {}", warning);
            }
            println!("  Seek table size: {}", config.stream.seek_table_size);
            println!("  Retain metadata: {}", config.stream.retain_metadata);
            println!("  Logging filter: {}", config.logging.filter);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            println!("  Seek table size: {}", config.stream.seek_table_size);
            println!("  Retain metadata: {}", config.stream.retain_metadata);
        }
    }

    Ok(())
}
