use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::commands::crop::crop;
use crate::commands::speak::{speak, SpeakRequest};
use crate::commands::text::read_normalized;
use crate::page_range::PageSet;
use crate::paths::validate_input;
use crate::pdf::text::{ExtractOptions, PdfTextExtractor};
use crate::speech::{EspeakSynthesizer, VoiceOptions};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfCropRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Pages to remove (e.g., '1-3,5 10-12')")]
    pub remove_pages: String,
    #[schemars(description = "Output file path (default: <input>_cropped.pdf)")]
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfReadTextRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Pages to leave out (e.g., '1-2,9')")]
    #[serde(default)]
    pub skip_pages: Option<String>,
    #[schemars(description = "Password for encrypted PDFs")]
    #[serde(default)]
    pub password: Option<String>,
    #[schemars(description = "Read content streams directly without layout analysis (default: false)")]
    #[serde(default)]
    pub raw: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSpeakRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Output .mp3 or .wav file (default: <input>.mp3)")]
    #[serde(default)]
    pub output: Option<String>,
    #[schemars(description = "Pages to leave out (e.g., '1-2,9')")]
    #[serde(default)]
    pub skip_pages: Option<String>,
    #[schemars(description = "Password for encrypted PDFs")]
    #[serde(default)]
    pub password: Option<String>,
    #[schemars(description = "espeak-ng voice name (default: en)")]
    #[serde(default)]
    pub voice: Option<String>,
    #[schemars(description = "Speaking rate in words per minute, 80-450 (default: 175)")]
    #[serde(default)]
    pub rate: Option<u32>,
    #[schemars(description = "Volume, 0-200 (default: 100)")]
    #[serde(default)]
    pub volume: Option<u32>,
}

fn extract_options(
    skip_pages: Option<&str>,
    password: Option<String>,
    raw: bool,
) -> crate::error::Result<ExtractOptions> {
    let skip = match skip_pages {
        Some(spec) => PageSet::parse(spec)?,
        None => PageSet::new(),
    };
    let mut options = ExtractOptions {
        password,
        skip,
        ..Default::default()
    };
    if raw {
        options.layout = None;
    }
    Ok(options)
}

fn voice_options(req: &PdfSpeakRequest) -> crate::error::Result<VoiceOptions> {
    let defaults = VoiceOptions::default();
    let rate = req.rate.unwrap_or(defaults.rate);
    let volume = req.volume.unwrap_or(defaults.volume);
    if !(80..=450).contains(&rate) {
        return Err(crate::error::Error::Argument(format!(
            "rate must be between 80 and 450, got {}",
            rate
        )));
    }
    if volume > 200 {
        return Err(crate::error::Error::Argument(format!(
            "volume must be between 0 and 200, got {}",
            volume
        )));
    }
    Ok(VoiceOptions {
        voice: req.voice.clone().unwrap_or(defaults.voice),
        rate,
        volume,
        ..defaults
    })
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Remove pages from a PDF and save the rest, in order, to a new file. Use page syntax like '1-3,5,10-12'.")]
    fn pdf_crop(&self, Parameters(req): Parameters<PdfCropRequest>) -> String {
        let remove = match PageSet::parse(&req.remove_pages) {
            Ok(p) => p,
            Err(e) => return format!("Error: {}", e),
        };
        let output = req.output.as_deref().map(Path::new);

        match crop(&req.path, remove.clone(), output) {
            Ok(outcome) => {
                // the crop has already checked every page against the document
                let result = CropResult {
                    output_path: outcome.output.display().to_string(),
                    page_count: outcome.page_count,
                    removed_pages: remove.to_sorted_vec(),
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Extract the text of a PDF, normalized for reading: line breaks inside paragraphs become spaces.")]
    fn pdf_read_text(&self, Parameters(req): Parameters<PdfReadTextRequest>) -> String {
        let path = PathBuf::from(&req.path);
        if let Err(e) = validate_input(&path, "pdf") {
            return format!("Error: {}", e);
        }
        let options = match extract_options(req.skip_pages.as_deref(), req.password, req.raw) {
            Ok(o) => o,
            Err(e) => return format!("Error: {}", e),
        };

        match read_normalized(&path, &options, &PdfTextExtractor) {
            Ok(text) => {
                let result = TextResult { text };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Read a PDF aloud into an .mp3 or .wav file using espeak-ng")]
    fn pdf_speak(&self, Parameters(req): Parameters<PdfSpeakRequest>) -> String {
        let voice = match voice_options(&req) {
            Ok(v) => v,
            Err(e) => return format!("Error: {}", e),
        };
        let extract = match extract_options(req.skip_pages.as_deref(), req.password, false) {
            Ok(o) => o,
            Err(e) => return format!("Error: {}", e),
        };
        let request = SpeakRequest {
            input: PathBuf::from(req.path),
            output: req.output.map(PathBuf::from),
            extract,
            voice,
        };

        match speak(&request, &PdfTextExtractor, &EspeakSynthesizer::default()) {
            Ok(outcome) => {
                let result = SpeakResult {
                    output_path: outcome.output.display().to_string(),
                    characters: outcome.characters,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CropResult {
    pub output_path: String,
    pub page_count: u32,
    pub removed_pages: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TextResult {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SpeakResult {
    pub output_path: String,
    pub characters: usize,
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF reading and page removal tools. Use pdf_read_text to get the text of a PDF, \
                 pdf_speak to synthesize it into an audio file, and pdf_crop to write a copy of a \
                 PDF without selected pages."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
