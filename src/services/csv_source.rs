use anyhow::{Context, Result};
use csv::{ByteRecord, StringRecord};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Streams typed records out of a headered CSV file.
///
/// Cells that are not valid UTF-8 read as empty, so only that field is lost.
/// Records that still fail to decode are skipped and counted; I/O failures
/// end the stream with an error.
pub struct CsvRecords<T> {
    reader: csv::Reader<File>,
    headers: StringRecord,
    row: ByteRecord,
    path: PathBuf,
    malformed: u64,
    _record: PhantomData<fn() -> T>,
}

pub fn open_records<T: DeserializeOwned>(path: &Path) -> Result<CsvRecords<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Opening input file {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Reading header of {}", path.display()))?
        .clone();
    Ok(CsvRecords {
        reader,
        headers,
        row: ByteRecord::new(),
        path: path.to_path_buf(),
        malformed: 0,
        _record: PhantomData,
    })
}

impl<T> CsvRecords<T> {
    pub fn malformed(&self) -> u64 {
        self.malformed
    }
}

fn text_cells(row: &ByteRecord) -> StringRecord {
    row.iter()
        .map(|cell| std::str::from_utf8(cell).unwrap_or(""))
        .collect()
}

impl<T: DeserializeOwned> Iterator for CsvRecords<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_byte_record(&mut self.row) {
                Ok(false) => return None,
                Ok(true) => {}
                Err(err) if err.is_io_error() => {
                    let path = self.path.display().to_string();
                    return Some(Err(anyhow::Error::new(err).context(format!("Reading {}", path))));
                }
                Err(err) => {
                    self.malformed += 1;
                    tracing::debug!("Skipping unreadable record in {}: {}", self.path.display(), err);
                    continue;
                }
            }

            match text_cells(&self.row).deserialize::<T>(Some(&self.headers)) {
                Ok(record) => return Some(Ok(record)),
                Err(err) => {
                    self.malformed += 1;
                    tracing::debug!("Skipping malformed record in {}: {}", self.path.display(), err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamGameRecord;
    use std::io::Write;

    #[test]
    fn test_reads_records_by_header() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "teamCity,extra,teamName,teamId").unwrap();
        writeln!(file, "Boston,x,Celtics,1610612738").unwrap();
        writeln!(file, "Miami,y,Heat,").unwrap();

        let records: Vec<TeamGameRecord> = open_records(file.path())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].team_name.as_deref(), Some("Celtics"));
        assert_eq!(records[0].team_id.as_deref(), Some("1610612738"));
        assert!(records[1].team_id.as_deref().unwrap_or("").is_empty());
        assert_eq!(records[1].win, None);
    }

    #[test]
    fn test_short_rows_fill_missing_columns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "teamCity,teamName,win").unwrap();
        writeln!(file, "Boston,Celtics").unwrap();

        let mut records = open_records::<TeamGameRecord>(file.path()).unwrap();
        let first = records.next().unwrap().unwrap();
        assert_eq!(first.team_city.as_deref(), Some("Boston"));
        assert_eq!(first.win, None);
        assert!(records.next().is_none());
    }

    #[test]
    fn test_invalid_utf8_cell_only_loses_that_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"teamCity,teamName,teamScore\n").unwrap();
        file.write_all(b"Boston,Celtics,11\xff2\n").unwrap();
        file.write_all(b"Miami,Heat,104\n").unwrap();

        let mut records = open_records::<TeamGameRecord>(file.path()).unwrap();
        let first = records.next().unwrap().unwrap();
        assert_eq!(first.team_city.as_deref(), Some("Boston"));
        assert_eq!(first.team_name.as_deref(), Some("Celtics"));
        assert!(first.team_score.as_deref().unwrap_or("").is_empty());

        let second = records.next().unwrap().unwrap();
        assert_eq!(second.team_score.as_deref(), Some("104"));
        assert!(records.next().is_none());
        assert_eq!(records.malformed(), 0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = open_records::<TeamGameRecord>(Path::new("/definitely/not/here.csv"));
        assert!(result.is_err());
    }
}
