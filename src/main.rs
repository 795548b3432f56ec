use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use imgconv::validate::require_format;
use imgconv::{ImageCodec, RasterCodec, ServerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imgconv", version, about = "Image format conversion server")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Serve POST /process-image
    Serve(ServerConfig),
    /// Convert a local file and print it as base64
    Convert {
        input: PathBuf,
        /// One of png, jpg, jpeg, webp
        #[arg(long, short)]
        format: String,
        /// Write the base64 text here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Serve(config) => imgconv::serve(config).await?,
        Cmd::Convert { input, format, output } => {
            let format = require_format(Some(format.as_str()))?;
            let data = std::fs::read(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let converted = RasterCodec.convert(&data, format)?;
            let encoded = STANDARD.encode(converted);

            match output {
                Some(path) => std::fs::write(&path, encoded)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(encoded.as_bytes())?;
                    stdout.write_all(b"\n")?;
                }
            }
        }
    }
    Ok(())
}
