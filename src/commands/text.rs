use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::output::write_atomically;
use crate::paths::{resolve_output, validate_input};
use crate::pdf::text::{normalize_whitespace, ExtractOptions, TextExtractor};

pub struct TextRequest {
    pub input: PathBuf,
    /// Defaults to `<input>.txt`; ignored when printing to stdout
    pub output: Option<PathBuf>,
    pub to_stdout: bool,
    pub extract: ExtractOptions,
}

/// Extract text from `input` and normalize it for reading aloud
pub fn read_normalized<E: TextExtractor>(
    input: &Path,
    options: &ExtractOptions,
    extractor: &E,
) -> Result<String> {
    let raw = extractor.extract(input, options)?;
    let text = normalize_whitespace(&raw);
    if text.is_empty() {
        return Err(Error::EmptyContent("no text was extracted"));
    }
    info!("Extracted {} characters from {}", text.len(), input.display());
    Ok(text)
}

/// Write the normalized text to a file; returns where it went
pub fn export<E: TextExtractor>(request: &TextRequest, extractor: &E) -> Result<PathBuf> {
    validate_input(&request.input, "pdf")?;
    let output = resolve_output(request.output.as_deref(), &request.input, "", "txt")?;

    let text = read_normalized(&request.input, &request.extract, extractor)?;
    write_atomically(&output, |file| {
        file.write_all(text.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    })
}

pub fn run<E: TextExtractor>(request: &TextRequest, extractor: &E) -> Result<()> {
    if request.to_stdout {
        validate_input(&request.input, "pdf")?;
        let text = read_normalized(&request.input, &request.extract, extractor)?;
        println!("{}", text);
        return Ok(());
    }

    let output = export(request, extractor)?;
    println!("Wrote text to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedText(&'static str);

    impl TextExtractor for FixedText {
        fn extract(&self, _path: &Path, _options: &ExtractOptions) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn request(dir: &Path, output: Option<PathBuf>) -> TextRequest {
        let input = dir.join("book.pdf");
        std::fs::write(&input, "%PDF-1.5").unwrap();
        TextRequest {
            input,
            output,
            to_stdout: false,
            extract: ExtractOptions::default(),
        }
    }

    #[test]
    fn test_export_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), None);

        let output = export(&req, &FixedText("Chapter one\nbegins.\n\nThe end")).unwrap();
        assert_eq!(output, dir.path().join("book.txt"));
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "Chapter one begins.\nThe end\n"
        );
    }

    #[test]
    fn test_export_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), None);

        let err = export(&req, &FixedText(" \n\n ")).unwrap_err();
        assert!(matches!(err, Error::EmptyContent(_)));
        assert!(!dir.path().join("book.txt").exists());
    }

    #[test]
    fn test_export_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("book.txt");
        let req = request(dir.path(), Some(out.clone()));

        let err = export(&req, &FixedText("text")).unwrap_err();
        assert!(matches!(err, Error::InvalidOutputDirectory(_)));
        assert!(!out.exists());
    }
}
