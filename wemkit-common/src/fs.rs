//! Path and filesystem helpers

use std::path::Path;

/// Classification of a directory entry by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Bank-description document (`.xml` by default)
    Description,
    /// Compiled sound bank container (`.bnk`)
    SoundBank,
    /// Raw streamed audio asset (`.wem` by default)
    SourceAudio,
    Other,
}

/// Extension used by compiled sound bank containers
pub const SOUND_BANK_EXTENSION: &str = "bnk";

/// Classify `path` by its extension (case-sensitive, as the game ships them)
pub fn classify(path: &Path, description_ext: &str, source_ext: &str) -> FileKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext == description_ext => FileKind::Description,
        Some(ext) if ext == source_ext => FileKind::SourceAudio,
        Some(SOUND_BANK_EXTENSION) => FileKind::SoundBank,
        _ => FileKind::Other,
    }
}

/// File name without its extension
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether `path` exists. Never errors: any failure reads as "absent".
pub async fn path_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

/// Whether `path` is an existing regular file
pub async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Check a CLI input/output directory pair: neither may be empty and the
/// input must exist. The output is created on demand later.
pub fn check_io_dirs(input: &Path, output: &Path) -> crate::Result<()> {
    if input.as_os_str().is_empty() || output.as_os_str().is_empty() {
        return Err(crate::Error::InvalidInput(
            "input and output directories must not be empty".to_string(),
        ));
    }
    if !input.exists() {
        return Err(crate::Error::InvalidInput(format!(
            "input directory {} does not exist",
            input.display()
        )));
    }
    Ok(())
}

/// Create `path` and all parents. Succeeds if it already exists.
pub async fn ensure_dir(path: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_classify_by_extension() {
        let kind = |p: &str| classify(Path::new(p), "xml", "wem");
        assert_eq!(kind("Banks/English(US)/Leader_Gandhi.xml"), FileKind::Description);
        assert_eq!(kind("1234.wem"), FileKind::SourceAudio);
        assert_eq!(kind("Init.bnk"), FileKind::SoundBank);
        assert_eq!(kind("readme.txt"), FileKind::Other);
        assert_eq!(kind("no_extension"), FileKind::Other);
        // Extensions are matched exactly
        assert_eq!(kind("UPPER.XML"), FileKind::Other);
    }

    #[test]
    fn test_check_io_dirs() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(check_io_dirs(temp.path(), Path::new("out")).is_ok());
        assert!(check_io_dirs(Path::new(""), Path::new("out")).is_err());
        assert!(check_io_dirs(temp.path(), Path::new("")).is_err());
        assert!(check_io_dirs(&temp.path().join("absent"), Path::new("out")).is_err());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(&PathBuf::from("/a/b/Music_Civ6.xml")), "Music_Civ6");
        assert_eq!(file_stem(&PathBuf::from("plain")), "plain");
    }

    #[tokio::test]
    async fn test_path_exists_and_ensure_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let nested = temp.path().join("English(US)").join("Bank");
        assert!(!path_exists(&nested).await);

        ensure_dir(&nested).await.unwrap();
        assert!(path_exists(&nested).await);
        assert!(!is_file(&nested).await);

        // Second call is a no-op
        ensure_dir(&nested).await.unwrap();
    }
}
