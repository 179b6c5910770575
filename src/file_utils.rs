use anyhow::{Result, Context, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use std::fs::OpenOptions;
use std::io::Write;
use log::debug;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Default output path for a translated catalog
    // @params: input_file, target_language
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(target_language);
        output_filename.push_str(".po");

        input_file.with_file_name(output_filename)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Read the optional domain-context file
    ///
    /// JSON documents are validated and passed on verbatim like plain text.
    pub fn read_context_file<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Err(anyhow!("Context file does not exist: {:?}", path));
        }

        let content = Self::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str::<serde_json::Value>(&content)
                .with_context(|| format!("Context file is not valid JSON: {:?}", path))?;
        }

        Ok(content)
    }

    /// Append JSON lines to a log file, creating it if needed
    pub fn append_json_lines<P: AsRef<Path>>(path: P, lines: &[String]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        // Open file in append mode, create if it doesn't exist
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        for line in lines {
            writeln!(file, "{}", line)
                .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;
        }

        debug!("Appended {} records to {:?}", lines.len(), path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generateOutputPath_shouldAddLanguageSuffix() {
        let path = FileManager::generate_output_path("/tmp/locale/messages.po", "nb");
        assert_eq!(path, PathBuf::from("/tmp/locale/messages.nb.po"));
    }

    #[test]
    fn test_appendJsonLines_shouldAppendAcrossCalls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs/failed_items.log");

        FileManager::append_json_lines(&path, &["{\"a\":1}".to_string()]).unwrap();
        FileManager::append_json_lines(&path, &["{\"b\":2}".to_string()]).unwrap();
        FileManager::append_json_lines(&path, &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\"a\":1}\n{\"b\":2}\n");
    }

    #[test]
    fn test_readContextFile_withInvalidJson_shouldFail() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("context.json");
        fs::write(&json_path, "{not json").unwrap();
        assert!(FileManager::read_context_file(&json_path).is_err());

        let text_path = dir.path().join("context.txt");
        fs::write(&text_path, "  Garden machinery shop\n").unwrap();
        assert_eq!(FileManager::read_context_file(&text_path).unwrap(), "  Garden machinery shop\n");

        assert!(FileManager::read_context_file(dir.path().join("missing.txt")).is_err());
    }
}
