use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("mp3") => Ok(AudioFormat::Mp3),
            Some("wav") => Ok(AudioFormat::Wav),
            _ => Err(Error::Argument(format!(
                "Output must be a .mp3 or .wav file: {}",
                path.display()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceOptions {
    pub voice: String,
    /// Words per minute
    pub rate: u32,
    /// Amplitude, 0-200
    pub volume: u32,
    /// 0-99
    pub pitch: u32,
    /// Extra pause between words, in units of 10ms
    pub word_gap: Option<u32>,
}

impl Default for VoiceOptions {
    fn default() -> Self {
        VoiceOptions {
            voice: "en".to_string(),
            rate: 175,
            volume: 100,
            pitch: 50,
            word_gap: None,
        }
    }
}

pub trait Synthesizer {
    /// Speak `text` into a new audio file at `output`
    fn synthesize(
        &self,
        text: &str,
        voice: &VoiceOptions,
        format: AudioFormat,
        output: &Path,
    ) -> Result<()>;
}

/// Runs `espeak-ng`, piping through `lame` when MP3 is wanted.
#[derive(Debug, Clone)]
pub struct EspeakSynthesizer {
    pub espeak: PathBuf,
    pub lame: PathBuf,
}

impl Default for EspeakSynthesizer {
    fn default() -> Self {
        EspeakSynthesizer {
            espeak: PathBuf::from("espeak-ng"),
            lame: PathBuf::from("lame"),
        }
    }
}

impl EspeakSynthesizer {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(espeak: P, lame: Q) -> Self {
        EspeakSynthesizer {
            espeak: espeak.into(),
            lame: lame.into(),
        }
    }

    fn spawn_error(program: &Path, err: io::Error) -> Error {
        if err.kind() == io::ErrorKind::NotFound {
            Error::Synthesis(format!(
                "{} was not found; install it or point to it explicitly",
                program.display()
            ))
        } else {
            Error::Synthesis(format!("failed to run {}: {}", program.display(), err))
        }
    }

    fn check(program: &Path, output: &Output) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }
        Err(Error::Synthesis(format!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

/// espeak-ng arguments for reading `text_file` with `voice`
pub fn espeak_args(
    voice: &VoiceOptions,
    format: AudioFormat,
    text_file: &Path,
    output: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-v".into(),
        voice.voice.clone().into(),
        "-s".into(),
        voice.rate.to_string().into(),
        "-a".into(),
        voice.volume.to_string().into(),
        "-p".into(),
        voice.pitch.to_string().into(),
    ];
    if let Some(gap) = voice.word_gap {
        args.push("-g".into());
        args.push(gap.to_string().into());
    }
    args.push("-f".into());
    args.push(text_file.into());
    match format {
        AudioFormat::Wav => {
            args.push("-w".into());
            args.push(output.into());
        }
        AudioFormat::Mp3 => args.push("--stdout".into()),
    }
    args
}

impl Synthesizer for EspeakSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        voice: &VoiceOptions,
        format: AudioFormat,
        output: &Path,
    ) -> Result<()> {
        // Dropped (and deleted) when this call returns
        let mut text_file = tempfile::Builder::new()
            .prefix("pdftomp3-")
            .suffix(".txt")
            .tempfile()?;
        text_file.write_all(text.as_bytes())?;
        text_file.flush()?;

        let args = espeak_args(voice, format, text_file.path(), output);
        debug!("Running {} {:?}", self.espeak.display(), args);

        match format {
            AudioFormat::Wav => {
                let result = Command::new(&self.espeak)
                    .args(&args)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::piped())
                    .output()
                    .map_err(|e| Self::spawn_error(&self.espeak, e))?;
                Self::check(&self.espeak, &result)
            }
            AudioFormat::Mp3 => {
                let mut espeak = Command::new(&self.espeak)
                    .args(&args)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .spawn()
                    .map_err(|e| Self::spawn_error(&self.espeak, e))?;

                let wav = espeak
                    .stdout
                    .take()
                    .ok_or_else(|| Error::Synthesis("espeak-ng stdout unavailable".to_string()))?;

                let lame = Command::new(&self.lame)
                    .arg("--quiet")
                    .arg("-")
                    .arg(output)
                    .stdin(Stdio::from(wav))
                    .stdout(Stdio::null())
                    .stderr(Stdio::piped())
                    .spawn();
                let lame = match lame {
                    Ok(child) => child,
                    Err(e) => {
                        // reap espeak before reporting
                        let _ = espeak.kill();
                        let _ = espeak.wait();
                        return Err(Self::spawn_error(&self.lame, e));
                    }
                };

                let espeak_result = espeak.wait_with_output()?;
                let lame_result = lame.wait_with_output()?;
                Self::check(&self.espeak, &espeak_result)?;
                Self::check(&self.lame, &lame_result)
            }
        }
    }
}
