//! Path-list export for selected records.
//!
//! Writes the full paths of a selection to a plain-text file (one path per
//! line) or a JSON-lines file using the manifest entry schema, so an
//! exported list can feed the scorer directly.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::models::ManifestEntry;

/// Output format for a path-list export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFormat {
    /// One raw path per line.
    #[default]
    PlainText,
    /// One `{"path": ...}` object per line.
    JsonLines,
}

impl ListFormat {
    /// Infer the format from the output file extension.
    ///
    /// `.jsonl` selects JSON-lines; anything else is plain text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") => ListFormat::JsonLines,
            _ => ListFormat::PlainText,
        }
    }
}

/// Write the given paths to `output_path` in the requested format.
///
/// Returns the number of lines written. Paths are written in the order
/// given - callers pass their current display order.
pub fn write_path_list<P: AsRef<Path>>(
    paths: &[P],
    output_path: &Path,
    format: ListFormat,
) -> io::Result<usize> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    let mut count = 0;
    for path in paths {
        let path_str = path.as_ref().to_string_lossy();
        match format {
            ListFormat::PlainText => writeln!(writer, "{}", path_str)?,
            ListFormat::JsonLines => {
                let entry = ManifestEntry::new(path_str.clone().into_owned());
                serde_json::to_writer(&mut writer, &entry).map_err(io::Error::other)?;
                writeln!(writer)?;
            }
        }
        count += 1;
    }

    writer.flush()?;
    tracing::info!(
        "Exported {} file paths to {}",
        count,
        output_path.display()
    );
    Ok(count)
}
