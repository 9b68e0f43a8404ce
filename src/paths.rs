use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Check that `path` is an existing file ending in `.{extension}`
pub fn validate_input(path: &Path, extension: &str) -> Result<()> {
    if !path.exists() {
        return Err(Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "file does not exist",
        });
    }
    if !path.is_file() {
        return Err(Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "not a regular file",
        });
    }
    if !has_extension(path, extension) {
        return Err(Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "unexpected file extension",
        });
    }
    Ok(())
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// `<dir>/<stem><suffix>.<extension>` next to `input`
pub fn default_output(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{}{}.{}", stem, suffix, extension))
}

/// Check that the directory an output would be written into exists
pub fn validate_output_dir(output: &Path) -> Result<()> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(Error::InvalidOutputDirectory(dir.to_path_buf()));
    }
    Ok(())
}

/// Resolve the output path (explicit or default) and validate its directory
pub fn resolve_output(
    explicit: Option<&Path>,
    input: &Path,
    suffix: &str,
    extension: &str,
) -> Result<PathBuf> {
    let output = match explicit {
        Some(p) => p.to_path_buf(),
        None => default_output(input, suffix, extension),
    };
    validate_output_dir(&output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input() {
        let err = validate_input(Path::new("/definitely/not/here.pdf"), "pdf").unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn test_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        let err = validate_input(&path, "pdf").unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn test_directory_input_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folder.pdf");
        std::fs::create_dir(&path).unwrap();
        assert!(validate_input(&path, "pdf").is_err());
    }

    #[test]
    fn test_extension_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("REPORT.PDF");
        std::fs::write(&path, "%PDF-1.5").unwrap();
        assert!(validate_input(&path, "pdf").is_ok());
    }

    #[test]
    fn test_default_output() {
        let input = Path::new("/books/novel.pdf");
        assert_eq!(
            default_output(input, "", "mp3"),
            PathBuf::from("/books/novel.mp3")
        );
        assert_eq!(
            default_output(input, "_cropped", "pdf"),
            PathBuf::from("/books/novel_cropped.pdf")
        );
        assert_eq!(
            default_output(Path::new("novel.pdf"), "", "txt"),
            PathBuf::from("novel.txt")
        );
    }

    #[test]
    fn test_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nope").join("out.pdf");
        let err = validate_output_dir(&output).unwrap_err();
        assert!(matches!(err, Error::InvalidOutputDirectory(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_bare_file_name_uses_current_directory() {
        assert!(validate_output_dir(Path::new("out.pdf")).is_ok());
    }
}
