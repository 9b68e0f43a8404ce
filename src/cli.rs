use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::page_range::{PageRange, PageSet};
use crate::pdf::text::{ExtractOptions, LayoutOptions};
use crate::speech::{EspeakSynthesizer, VoiceOptions};

#[derive(Parser)]
#[command(name = "pdftomp3")]
#[command(about = "Read PDFs aloud into audio files and remove pages from PDFs")]
#[command(version)]
pub struct Cli {
    /// Log more (-v for info, -vv for debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synthesize the text of a PDF into an .mp3 or .wav file
    Speak {
        /// PDF file to read
        path: PathBuf,

        /// Output audio file [default: <input>.mp3]
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        extract: ExtractArgs,

        #[command(flatten)]
        voice: VoiceArgs,
    },

    /// Extract the normalized text of a PDF
    Text {
        /// PDF file to read
        path: PathBuf,

        /// Output text file [default: <input>.txt]
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<PathBuf>,

        /// Print the text instead of writing a file
        #[arg(long)]
        stdout: bool,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Remove pages from a PDF
    Crop {
        /// PDF file to crop
        path: PathBuf,

        /// Pages to remove (e.g., "1-3 5 10-12" or "1-3,5")
        #[arg(
            short = 'f',
            long = "filter",
            required = true,
            num_args = 1..,
            value_delimiter = ',',
            value_parser = page_token
        )]
        filter: Vec<PageRange>,

        /// Output file [default: <input>_cropped.pdf]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run as MCP server over stdio
    Mcp,
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Password for encrypted PDFs
    #[arg(short = 'P', long)]
    pub password: Option<String>,

    /// Pages to leave out (e.g., "1-2 9" or "1-2,9")
    #[arg(
        short = 's',
        long = "skip",
        num_args = 1..,
        value_delimiter = ',',
        value_parser = page_token
    )]
    pub skip: Vec<PageRange>,

    /// Read at most this many pages (0 for no limit)
    #[arg(short = 'm', long)]
    pub max_pages: Option<u32>,

    /// Degrees to rotate every page by (multiple of 90)
    #[arg(short = 'R', long, default_value = "0", value_parser = parse_rotation, allow_hyphen_values = true)]
    pub rotation: i64,

    /// Read content streams directly, without layout analysis
    #[arg(short = 'n', long)]
    pub no_layout: bool,

    /// Include text found inside figures
    #[arg(short = 'A', long)]
    pub all_texts: bool,

    /// Detect vertical text
    #[arg(short = 'V', long)]
    pub detect_vertical: bool,

    /// Character margin for line grouping
    #[arg(short = 'M', long, default_value = "2.0")]
    pub char_margin: f32,

    /// Line margin for paragraph grouping
    #[arg(short = 'L', long, default_value = "0.5")]
    pub line_margin: f32,

    /// Word margin for inserting spaces
    #[arg(short = 'W', long, default_value = "0.1")]
    pub word_margin: f32,

    /// Weight of vertical position in reading order, -1.0 to 1.0
    #[arg(short = 'F', long, default_value = "0.5", allow_hyphen_values = true)]
    pub boxes_flow: f32,

    /// Disable box-flow ordering
    #[arg(long, conflicts_with = "boxes_flow")]
    pub no_boxes_flow: bool,
}

impl ExtractArgs {
    pub fn to_options(&self) -> ExtractOptions {
        let layout = (!self.no_layout).then(|| LayoutOptions {
            char_margin: self.char_margin,
            line_margin: self.line_margin,
            word_margin: self.word_margin,
            boxes_flow: (!self.no_boxes_flow).then_some(self.boxes_flow),
            detect_vertical: self.detect_vertical,
            all_texts: self.all_texts,
        });
        ExtractOptions {
            password: self.password.clone(),
            skip: PageSet::from_ranges(&self.skip),
            max_pages: self.max_pages,
            rotation: self.rotation,
            layout,
        }
    }
}

#[derive(Args)]
pub struct VoiceArgs {
    /// espeak-ng voice name
    #[arg(long, default_value = "en", env = "PDFTOMP3_VOICE")]
    pub voice: String,

    /// Speaking rate in words per minute
    #[arg(long, default_value = "175", value_parser = clap::value_parser!(u32).range(80..=450))]
    pub rate: u32,

    /// Volume (amplitude), 0-200
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(0..=200))]
    pub volume: u32,

    /// Pitch, 0-99
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u32).range(0..=99))]
    pub pitch: u32,

    /// Extra pause between words, in units of 10ms
    #[arg(long)]
    pub word_gap: Option<u32>,

    /// espeak-ng program
    #[arg(long, default_value = "espeak-ng", env = "PDFTOMP3_ESPEAK")]
    pub espeak: PathBuf,

    /// lame program, used for .mp3 output
    #[arg(long, default_value = "lame", env = "PDFTOMP3_LAME")]
    pub lame: PathBuf,
}

impl VoiceArgs {
    pub fn to_options(&self) -> VoiceOptions {
        VoiceOptions {
            voice: self.voice.clone(),
            rate: self.rate,
            volume: self.volume,
            pitch: self.pitch,
            word_gap: self.word_gap,
        }
    }

    pub fn synthesizer(&self) -> EspeakSynthesizer {
        EspeakSynthesizer::new(&self.espeak, &self.lame)
    }
}

fn page_token(s: &str) -> Result<PageRange, String> {
    PageRange::parse(s).map_err(|e| e.to_string())
}

fn parse_rotation(s: &str) -> Result<i64, String> {
    let value = s.parse::<i64>().map_err(|_| "Not a number.")?;
    if value % 90 != 0 {
        return Err("Must be a multiple of 90.".to_string());
    }
    Ok(value)
}
