use std::path::PathBuf;
use tracing::info;

use crate::error::Result;
use crate::output::StagedOutput;
use crate::paths::{resolve_output, validate_input};
use crate::pdf::text::{ExtractOptions, TextExtractor};
use crate::speech::{AudioFormat, Synthesizer, VoiceOptions};

use super::text::read_normalized;

pub struct SpeakRequest {
    pub input: PathBuf,
    /// Defaults to `<input>.mp3`
    pub output: Option<PathBuf>,
    pub extract: ExtractOptions,
    pub voice: VoiceOptions,
}

#[derive(Debug, Clone)]
pub struct SpeakOutcome {
    pub output: PathBuf,
    pub characters: usize,
}

/// Read the PDF aloud into an audio file.
///
/// Paths are checked before any text is extracted, and the audio file only
/// appears once synthesis has finished successfully.
pub fn speak<E: TextExtractor, S: Synthesizer>(
    request: &SpeakRequest,
    extractor: &E,
    synthesizer: &S,
) -> Result<SpeakOutcome> {
    validate_input(&request.input, "pdf")?;
    let output = resolve_output(request.output.as_deref(), &request.input, "", "mp3")?;
    let format = AudioFormat::from_path(&output)?;

    let text = read_normalized(&request.input, &request.extract, extractor)?;

    let staged = StagedOutput::new(&output)?;
    info!("Synthesizing {:?} audio for {}", format, staged.target().display());
    synthesizer.synthesize(&text, &request.voice, format, staged.path())?;
    let output = staged.commit()?;

    Ok(SpeakOutcome {
        output,
        characters: text.chars().count(),
    })
}

pub fn run<E: TextExtractor, S: Synthesizer>(
    request: &SpeakRequest,
    extractor: &E,
    synthesizer: &S,
) -> Result<()> {
    let outcome = speak(request, extractor, synthesizer)?;
    println!(
        "Spoke {} characters into {}",
        outcome.characters,
        outcome.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::path::Path;

    struct FixedText(&'static str);

    impl TextExtractor for FixedText {
        fn extract(&self, _path: &Path, _options: &ExtractOptions) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    /// Records what it was asked to speak and writes a marker file
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(String, AudioFormat)>>,
        fail: bool,
    }

    impl Synthesizer for Recorder {
        fn synthesize(
            &self,
            text: &str,
            _voice: &VoiceOptions,
            format: AudioFormat,
            output: &Path,
        ) -> Result<()> {
            self.calls.borrow_mut().push((text.to_string(), format));
            std::fs::write(output, b"audio")?;
            if self.fail {
                return Err(Error::Synthesis("boom".to_string()));
            }
            Ok(())
        }
    }

    fn request(dir: &Path, output: Option<PathBuf>) -> SpeakRequest {
        let input = dir.join("book.pdf");
        std::fs::write(&input, "%PDF-1.5").unwrap();
        SpeakRequest {
            input,
            output,
            extract: ExtractOptions::default(),
            voice: VoiceOptions::default(),
        }
    }

    #[test]
    fn test_speak_normalizes_text() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), None);
        let synth = Recorder::default();

        let outcome = speak(&req, &FixedText("It was a dark\nand stormy night.\n\n\nThe end."), &synth)
            .unwrap();

        assert_eq!(outcome.output, dir.path().join("book.mp3"));
        assert_eq!(std::fs::read(&outcome.output).unwrap(), b"audio");
        let calls = synth.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "It was a dark and stormy night.\nThe end.");
        assert_eq!(calls[0].1, AudioFormat::Mp3);
    }

    #[test]
    fn test_speak_wav_output() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), Some(dir.path().join("out.wav")));
        let synth = Recorder::default();

        speak(&req, &FixedText("hello"), &synth).unwrap();
        assert_eq!(synth.calls.borrow()[0].1, AudioFormat::Wav);
        assert!(dir.path().join("out.wav").exists());
    }

    #[test]
    fn test_missing_input_never_synthesizes() {
        let dir = tempfile::tempdir().unwrap();
        let req = SpeakRequest {
            input: dir.path().join("absent.pdf"),
            output: None,
            extract: ExtractOptions::default(),
            voice: VoiceOptions::default(),
        };
        let synth = Recorder::default();

        let err = speak(&req, &FixedText("hello"), &synth).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
        assert!(synth.calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_output_dir_never_synthesizes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("book.mp3");
        let req = request(dir.path(), Some(out.clone()));
        let synth = Recorder::default();

        let err = speak(&req, &FixedText("hello"), &synth).unwrap_err();
        assert!(matches!(err, Error::InvalidOutputDirectory(_)));
        assert!(synth.calls.borrow().is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn test_unsupported_output_extension() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), Some(dir.path().join("book.ogg")));
        let synth = Recorder::default();

        let err = speak(&req, &FixedText("hello"), &synth).unwrap_err();
        assert!(matches!(err, Error::Argument(_)));
        assert!(synth.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), None);
        let synth = Recorder::default();

        let err = speak(&req, &FixedText("\n \n"), &synth).unwrap_err();
        assert!(matches!(err, Error::EmptyContent(_)));
        assert!(synth.calls.borrow().is_empty());
    }

    #[test]
    fn test_failed_synthesis_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), None);
        let synth = Recorder {
            fail: true,
            ..Default::default()
        };

        assert!(speak(&req, &FixedText("hello"), &synth).is_err());
        assert!(!dir.path().join("book.mp3").exists());
        // only the input remains
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
