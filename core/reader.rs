use std::fs;
use std::path::Path;

/// Marker prefix the splitter uses to locate record boundaries. Every file
/// record starts with this literal followed by the relative path.
pub const FILE_MARKER: &str = ">>>File: ";

const SEPARATOR_WIDTH: usize = 40;
const LATIN1_WARNING: &str = "[Warning: File read as latin-1, may not be correct]\n";

/// The loaded content of one included file. A failed read never aborts the
/// scan; it yields a placeholder record plus an entry for the caller's
/// non-fatal error list.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub relative_path: String,
    pub content: String,
    pub read_error: Option<String>,
}

impl FileRecord {
    /// Wraps the content in the uniform record delimiters: the marker line
    /// with the relative path before it, a fixed-width separator after it.
    pub fn render(&self) -> String {
        format!(
            "{}{}\n\n{}\n\n{}\n",
            FILE_MARKER,
            self.relative_path,
            self.content,
            "=".repeat(SEPARATOR_WIDTH)
        )
    }
}

/// Reads one file, decoding as UTF-8 first and falling back to Latin-1 with
/// a visible warning prefix. I/O failures produce a bracketed placeholder.
pub fn read_record(root: &Path, relative_path: &str) -> FileRecord {
    let path = root.join(relative_path);
    match fs::read(&path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(content) => FileRecord {
                relative_path: relative_path.to_string(),
                content,
                read_error: None,
            },
            Err(e) => {
                log::debug!(
                    "Falling back to latin-1 for non-UTF-8 file: {}",
                    path.display()
                );
                let decoded: String = e.into_bytes().iter().map(|&b| b as char).collect();
                FileRecord {
                    relative_path: relative_path.to_string(),
                    content: format!("{}{}", LATIN1_WARNING, decoded),
                    read_error: None,
                }
            }
        },
        Err(e) => {
            log::warn!("Error reading file {}: {}", relative_path, e);
            FileRecord {
                relative_path: relative_path.to_string(),
                content: format!("[Error reading file: {}]", e),
                read_error: Some(format!("Error reading file {}: {}", relative_path, e)),
            }
        }
    }
}
