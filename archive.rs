use crate::error::Result;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name offered to the browser for the download
pub const ARCHIVE_FILE_NAME: &str = "converted-texts.zip";

/// In-memory zip of converted text files
pub struct TextArchive {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
}

impl TextArchive {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            names: HashSet::new(),
        }
    }

    /// Add a text entry, returning the name actually used.
    ///
    /// Repeated names get a ` (n)` suffix before the extension.
    pub fn add(&mut self, name: &str, text: &str) -> Result<String> {
        let entry_name = self.unique_name(name);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        self.writer.start_file(entry_name.as_str(), options)?;
        self.writer.write_all(text.as_bytes())?;
        self.names.insert(entry_name.clone());

        debug!("Added {} ({} bytes) to archive", entry_name, text.len());
        Ok(entry_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Close the archive and return its bytes
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }

    fn unique_name(&self, name: &str) -> String {
        if !self.names.contains(name) {
            return name.to_string();
        }

        let (stem, ext) = match name.rfind('.') {
            Some(idx) if idx > 0 => name.split_at(idx),
            _ => (name, ""),
        };

        (2..)
            .map(|n| format!("{} ({}){}", stem, n, ext))
            .find(|candidate| !self.names.contains(candidate))
            .unwrap_or_else(|| name.to_string())
    }
}

impl Default for TextArchive {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entries(bytes: Vec<u8>) -> Vec<(String, String)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut content = String::new();
                file.read_to_string(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    #[test]
    fn test_archive_contains_added_texts() {
        let mut archive = TextArchive::new();
        archive.add("a.txt", "first document").unwrap();
        archive.add("b.txt", "second document").unwrap();
        assert_eq!(archive.len(), 2);

        let entries = read_entries(archive.finish().unwrap());
        assert_eq!(
            entries,
            vec![
                ("a.txt".to_string(), "first document".to_string()),
                ("b.txt".to_string(), "second document".to_string()),
            ]
        );
    }

    #[test]
    fn test_duplicate_names_are_suffixed() {
        let mut archive = TextArchive::new();
        assert_eq!(archive.add("report.txt", "one").unwrap(), "report.txt");
        assert_eq!(archive.add("report.txt", "two").unwrap(), "report (2).txt");
        assert_eq!(archive.add("report.txt", "three").unwrap(), "report (3).txt");

        let names: Vec<String> = read_entries(archive.finish().unwrap())
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["report.txt", "report (2).txt", "report (3).txt"]);
    }

    #[test]
    fn test_empty_archive_is_valid_zip() {
        let archive = TextArchive::new();
        assert!(archive.is_empty());

        let entries = read_entries(archive.finish().unwrap());
        assert!(entries.is_empty());
    }
}
