use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use tsreshape::{
    partition_by_values_with, reshape, Frame, FrameNaming, PartitionOptions, TimeSeriesFormat,
};

#[derive(Parser)]
#[command(name = "tsreshape")]
#[command(about = "Reshape time-series frames between wide, long and multi layouts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON array of frames to a target layout
    Reshape {
        /// Target layout
        #[arg(long, value_enum, default_value_t = Format::Wide)]
        format: Format,

        #[command(flatten)]
        args: IoArgs,
    },
    /// Split each frame by the distinct values of key fields
    Partition {
        /// Key field name (repeatable)
        #[arg(long = "field", required = true)]
        fields: Vec<String>,

        /// Keep key fields in the partitioned frames
        #[arg(long)]
        keep_fields: bool,

        /// Identify series by frame name instead of labels
        #[arg(long)]
        as_names: bool,

        /// Render names as `key=value`
        #[arg(long)]
        with_names: bool,

        /// Prefix names with the source frame name
        #[arg(long)]
        append: bool,

        #[command(flatten)]
        args: IoArgs,
    },
}

#[derive(clap::Args)]
struct IoArgs {
    /// Input JSON file (stdin when omitted)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output JSON file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Wide,
    Long,
    Multi,
}

impl From<Format> for TimeSeriesFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Wide => TimeSeriesFormat::Wide,
            Format::Long => TimeSeriesFormat::Long,
            Format::Multi => TimeSeriesFormat::Multi,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Reshape { format, args } => {
            let frames = read_frames(args.input.as_deref())?;
            let format = TimeSeriesFormat::from(format);
            let out = reshape(&frames, format)
                .with_context(|| format!("reshape {} frames to {format:?}", frames.len()))?;
            info!("reshaped {} frames into {}", frames.len(), out.len());
            write_frames(args.output.as_deref(), &out, args.pretty)?;
        }
        Commands::Partition {
            fields,
            keep_fields,
            as_names,
            with_names,
            append,
            args,
        } => {
            let options = PartitionOptions {
                fields,
                naming: FrameNaming {
                    as_labels: !as_names,
                    append,
                    with_names,
                    ..FrameNaming::default()
                },
                keep_fields,
            };
            let frames = read_frames(args.input.as_deref())?;
            let mut out = Vec::new();
            for frame in &frames {
                out.extend(
                    partition_by_values_with(frame, &options)
                        .with_context(|| format!("partition frame {:?}", frame.name))?,
                );
            }
            info!("partitioned {} frames into {}", frames.len(), out.len());
            write_frames(args.output.as_deref(), &out, args.pretty)?;
        }
    }

    Ok(())
}

fn read_frames(path: Option<&Path>) -> Result<Vec<Frame>> {
    let reader: Box<dyn Read> = match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    serde_json::from_reader(reader).context("parse frames")
}

fn write_frames(path: Option<&Path>, frames: &[Frame], pretty: bool) -> Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    if pretty {
        serde_json::to_writer_pretty(&mut writer, frames).context("write frames")?;
    } else {
        serde_json::to_writer(&mut writer, frames).context("write frames")?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
