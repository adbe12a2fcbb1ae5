//! Tabular event sources.
//!
//! Each source is one CSV file in the sources directory. The file stem names
//! the department the events belong to.

mod schema;

pub use schema::{ColumnMapping, sniff};

use std::path::{Path, PathBuf};

use crate::error::{AgendaError, AgendaResult};
use crate::error_log::{ErrorKind, ErrorRecord};
use crate::event::SourceRowRef;

/// A source table read fully into memory: header plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    /// Department name (file stem).
    pub id: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows that weren't valid UTF-8 and were decoded with replacement
    /// characters. The rows themselves are kept.
    pub problems: Vec<ErrorRecord>,
}

impl SourceTable {
    pub fn from_file(path: &Path) -> AgendaResult<Self> {
        let id = source_id(path)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut records = reader.byte_records();

        let (header, header_lossy) = match records.next() {
            Some(record) => decode(&record?),
            None => (Vec::new(), false),
        };

        let mut table = SourceTable {
            id,
            header,
            rows: Vec::new(),
            problems: Vec::new(),
        };

        if header_lossy {
            if table.mapping().is_none() {
                return Err(AgendaError::Source(format!(
                    "Header of {} is not valid UTF-8",
                    path.display()
                )));
            }
            let problem = table.invalid_text(1, &table.header);
            table.problems.push(problem);
        }

        for (index, record) in records.enumerate() {
            let (cells, lossy) = decode(&record?);
            if lossy {
                let problem = table.invalid_text(Self::row_number(index), &cells);
                table.problems.push(problem);
            }
            table.rows.push(cells);
        }

        Ok(table)
    }

    fn invalid_text(&self, row: usize, cells: &[String]) -> ErrorRecord {
        let row_ref = SourceRowRef {
            source: self.id.clone(),
            row,
        };
        ErrorRecord::data(&row_ref, "Invalid characters replaced (not UTF-8)")
            .with_details(cells.join(", "))
    }

    /// Column mapping if this table qualifies as an event source.
    pub fn mapping(&self) -> Option<ColumnMapping> {
        sniff(&self.header)
    }

    /// Spreadsheet-style row number for the data row at `index` (header is row 1).
    pub fn row_number(index: usize) -> usize {
        index + 2
    }
}

/// Decode a raw CSV record cell by cell. The flag is set when any cell
/// needed replacement characters.
fn decode(record: &csv::ByteRecord) -> (Vec<String>, bool) {
    let mut lossy = false;
    let cells = record
        .iter()
        .map(|cell| match std::str::from_utf8(cell) {
            Ok(text) => text.to_string(),
            Err(_) => {
                lossy = true;
                String::from_utf8_lossy(cell).into_owned()
            }
        })
        .collect();
    (cells, lossy)
}

fn source_id(path: &Path) -> AgendaResult<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(String::from)
        .ok_or_else(|| AgendaError::Source(format!("Bad source name: {}", path.display())))
}

/// Every source file of a refresh.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    pub tables: Vec<SourceTable>,
    /// Departments whose file exists but couldn't be read at all.
    pub unreadable: Vec<String>,
    /// One DATA record per unreadable file.
    pub errors: Vec<ErrorRecord>,
}

/// Read every `*.csv` source in `dir`, sorted by file name.
///
/// The directory itself must exist. A file that can't be read is reported
/// and listed as unreadable rather than failing the whole refresh.
pub fn read_sources(dir: &Path) -> AgendaResult<SourceSet> {
    if !dir.is_dir() {
        return Err(AgendaError::SourcesNotFound(dir.display().to_string()));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_source_file(path))
        .collect();

    paths.sort();

    let mut sources = SourceSet::default();

    for path in &paths {
        match SourceTable::from_file(path) {
            Ok(table) => sources.tables.push(table),
            Err(e) => {
                tracing::warn!("Skipping source {}: {}", path.display(), e);
                let department = source_id(path).unwrap_or_else(|_| path.display().to_string());
                sources.errors.push(
                    ErrorRecord::new(ErrorKind::Data, "Unreadable source file")
                        .with_department(department.clone())
                        .with_details(e.to_string()),
                );
                sources.unreadable.push(department);
            }
        }
    }

    Ok(sources)
}

/// Departments of the tables that qualify as event sources, in read order.
pub fn departments(tables: &[SourceTable]) -> Vec<String> {
    tables
        .iter()
        .filter(|t| t.mapping().is_some())
        .map(|t| t.id.clone())
        .collect()
}

/// Whether a path looks like a source table (used by the file watcher too).
pub fn is_source_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_csv_sources_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Sport.csv"),
            "Date,Service,Événement\n2025-09-12,EPS,Cross\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("Arts.csv"),
            "Début,Fin,Service,Événement\n 2025-10-01 , ,Arts,Expo\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a source").unwrap();

        let tables = read_sources(dir.path()).unwrap().tables;
        let ids: Vec<_> = tables.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["Arts", "Sport"]);

        let arts = &tables[0];
        assert_eq!(arts.header, vec!["Début", "Fin", "Service", "Événement"]);
        assert_eq!(arts.rows[0], vec!["2025-10-01", "", "Arts", "Expo"]);
        assert!(arts.mapping().is_some());
    }

    #[test]
    fn ragged_rows_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Musique.csv");
        std::fs::write(&path, "Date,Service,Événement,Sur place\n2025-09-12,Chorale\n").unwrap();

        let table = SourceTable::from_file(&path).unwrap();
        assert_eq!(table.rows[0].len(), 2);
    }

    #[test]
    fn non_utf8_row_is_kept_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Musique.csv");
        std::fs::write(
            &path,
            b"Date,Service,Evenement,Sur place\n2025-10-20,Chorale,Concert,oui\n2025-10-22,Chorale,F\xeate,oui\n",
        )
        .unwrap();

        let table = SourceTable::from_file(&path).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][2], "F\u{fffd}te");

        assert_eq!(table.problems.len(), 1);
        assert_eq!(table.problems[0].kind, ErrorKind::Data);
        assert_eq!(table.problems[0].row_ref, "Musique:3");
    }

    #[test]
    fn unreadable_source_is_reported_not_dropped_silently() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("CDI.csv"),
            "Date,Service,Evenement\n05/11/2025,Documentation,Prix\n",
        )
        .unwrap();
        // Windows-1252 header: "Début" and "Événement" don't decode
        std::fs::write(
            dir.path().join("Musique.csv"),
            b"D\xe9but,Service,\xc9v\xe9nement\n2025-10-20,Chorale,Concert\n",
        )
        .unwrap();

        let sources = read_sources(dir.path()).unwrap();
        let ids: Vec<_> = sources.tables.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["CDI"]);
        assert_eq!(sources.unreadable, vec!["Musique"]);
        assert_eq!(sources.errors.len(), 1);
        assert_eq!(sources.errors[0].kind, ErrorKind::Data);
        assert_eq!(sources.errors[0].department, "Musique");
    }

    #[test]
    fn missing_directory_is_structural_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_sources(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, AgendaError::SourcesNotFound(_)));
    }

    #[test]
    fn departments_skip_tables_that_dont_qualify() {
        let table = |id: &str, header: &[&str]| SourceTable {
            id: id.to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            problems: Vec::new(),
        };

        let tables = [
            table("CDI", &["Date", "Service", "Evenement"]),
            table("Notes", &["Nom", "Classe"]),
            table("Musique", &["Début", "Fin", "Service", "Événement"]),
        ];
        assert_eq!(departments(&tables), vec!["CDI", "Musique"]);
    }

    #[test]
    fn row_numbers_follow_spreadsheet_convention() {
        assert_eq!(SourceTable::row_number(0), 2);
        assert_eq!(SourceTable::row_number(9), 11);
    }
}
