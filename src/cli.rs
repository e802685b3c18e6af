use clap::{Parser, Subcommand, ValueEnum};
use flacseek_stream::SeekOrigin;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flacseek")]
#[command(author, version, about = "FLAC stream inspection and sample-accurate seeking")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show stream properties and metadata blocks
    Info {
        /// FLAC file to inspect
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List frame headers in stream order
    Frames {
        /// FLAC file to read
        #[arg(required = true)]
        file: PathBuf,

        /// Stop after this many frames
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the seek table, embedded or synthesized
    SeekTable {
        /// FLAC file to index
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Target number of synthesized seek points (overrides config)
        #[arg(short, long)]
        size: Option<usize>,
    },

    /// Seek to a sample and show the frame reached
    Seek {
        /// FLAC file to seek in
        #[arg(required = true)]
        file: PathBuf,

        /// Target sample, relative to the origin
        #[arg(allow_negative_numbers = true)]
        sample: i64,

        /// Origin the target is measured from
        #[arg(long, value_enum, default_value_t = Origin::Start)]
        from: Origin,

        /// Target number of synthesized seek points (overrides config)
        #[arg(short, long)]
        size: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Origin {
    Start,
    Current,
    End,
}

impl From<Origin> for SeekOrigin {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::Start => SeekOrigin::Start,
            Origin::Current => SeekOrigin::Current,
            Origin::End => SeekOrigin::End,
        }
    }
}
