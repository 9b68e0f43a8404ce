mod cli;
mod commands;
mod error;
mod mcp;
mod output;
mod page_range;
mod paths;
mod pdf;
mod speech;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use page_range::PageSet;
use pdf::text::PdfTextExtractor;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pdftomp3={}", default_level)));

    // stdout belongs to command output (and the MCP protocol)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Speak {
            path,
            output,
            extract,
            voice,
        } => {
            let request = commands::speak::SpeakRequest {
                input: path,
                output,
                extract: extract.to_options(),
                voice: voice.to_options(),
            };
            commands::speak::run(&request, &PdfTextExtractor, &voice.synthesizer())?;
        }
        Commands::Text {
            path,
            output,
            stdout,
            extract,
        } => {
            let request = commands::text::TextRequest {
                input: path,
                output,
                to_stdout: stdout,
                extract: extract.to_options(),
            };
            commands::text::run(&request, &PdfTextExtractor)?;
        }
        Commands::Crop {
            path,
            filter,
            output,
        } => {
            let remove = PageSet::from_ranges(&filter);
            commands::crop::run(&path, remove, output.as_deref())?;
        }
    }

    Ok(())
}
