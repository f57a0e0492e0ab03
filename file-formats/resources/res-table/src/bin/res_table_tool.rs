use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use res_table::{ChunkCursor, ChunkType, DecodeOptions, EncodeOptions, TableTypeChunk};

#[derive(Parser)]
#[command(name = "res_table_tool")]
#[command(about = "Inspect and normalize table type chunks of compiled resource tables")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the chunks following each other from an offset
    Info {
        /// Path to the file
        file: PathBuf,

        /// Offset of the first chunk
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Reject table type chunks whose entry data does not follow the offset table
        #[arg(long)]
        strict: bool,
    },

    /// Re-encode one table type chunk with a canonical layout
    Normalize {
        /// Input file
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Offset of the chunk in the input
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Write zero padding and reserved fields
        #[arg(long)]
        zero_reserved: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    }

    match cli.command {
        Commands::Info {
            file,
            offset,
            strict,
        } => info(&file, offset, strict),
        Commands::Normalize {
            input,
            output,
            offset,
            zero_reserved,
        } => normalize(&input, &output, offset, zero_reserved),
    }
}

fn info(file: &Path, offset: usize, strict: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(file)?;
    let options = if strict {
        DecodeOptions::strict()
    } else {
        DecodeOptions::default()
    };

    println!("File: {} ({} bytes)", file.display(), data.len());

    for chunk in ChunkCursor::at(&data, offset) {
        let chunk = chunk?;
        println!(
            "0x{:08X}  {:<16} header {:>5}  size {:>8}",
            chunk.offset,
            chunk.header.kind().to_string(),
            chunk.header.header_size,
            chunk.header.chunk_size
        );

        if chunk.header.kind() != ChunkType::TableType {
            continue;
        }

        let table = chunk.decode_table_type(options)?;
        println!("    Type id:        {}", table.resource_type());
        println!(
            "    Entries:        {} ({} present)",
            table.entry_count(),
            table.present_entries()
        );
        println!("    Config size:    {}", table.config().len());
        println!("    Entry data:     {} bytes", table.entry_data().len());
        println!(
            "    Entries start:  {}{}",
            table.entries_start(),
            if table.is_canonical() {
                String::new()
            } else {
                format!(" (canonical {})", table.canonical_entries_start())
            }
        );
    }

    Ok(())
}

fn normalize(
    input: &Path,
    output: &Path,
    offset: usize,
    zero_reserved: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    let chunk = TableTypeChunk::decode_at(&data, offset, DecodeOptions::default())?;

    let options = if zero_reserved {
        EncodeOptions::zero_reserved()
    } else {
        EncodeOptions::default()
    };
    let bytes = chunk.to_bytes(options)?;
    std::fs::write(output, &bytes)?;

    println!(
        "Wrote {} bytes to {} (entries start {} -> {})",
        bytes.len(),
        output.display(),
        chunk.entries_start(),
        chunk.canonical_entries_start()
    );

    Ok(())
}
