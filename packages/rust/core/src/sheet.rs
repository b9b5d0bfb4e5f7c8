//! Tabular row reading.
//!
//! The loader only sees rows of cell strings; tokenizing is delegated to a
//! [`SheetReader`]. [`TsvReader`] is the default.

use std::path::Path;

use tabby_shared::{Result, TabbyError};

/// Supplies the raw rows of a sheet file.
pub trait SheetReader {
    /// Read all non-comment, non-blank rows of `path`.
    fn read_rows(&self, path: &Path) -> Result<Vec<Vec<String>>>;
}

/// Tab-separated reader: no quoting, variable row lengths, `#` comment lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TsvReader;

impl SheetReader for TsvReader {
    fn read_rows(&self, path: &Path) -> Result<Vec<Vec<String>>> {
        let file = std::fs::File::open(path).map_err(|e| TabbyError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .comment(Some(b'#'))
            .from_reader(file);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| TabbyError::sheet(path, e.to_string()))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_ragged_rows_and_skips_comments() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("authors.tsv");
        std::fs::write(
            &path,
            "# authors of the dataset\nname\temail\n\nJane \"JD\" Doe\tjane@example.com\textra\n\t\t\nJohn\n",
        )
        .unwrap();

        let rows = TsvReader.read_rows(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["name".to_string(), "email".to_string()],
                vec![
                    "Jane \"JD\" Doe".to_string(),
                    "jane@example.com".to_string(),
                    "extra".to_string()
                ],
                vec!["John".to_string()],
            ]
        );
    }

    #[test]
    fn missing_sheet_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = TsvReader.read_rows(&tmp.path().join("nope.tsv")).unwrap_err();
        assert!(matches!(err, TabbyError::Io { .. }));
    }
}
