use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value;

use crate::prelude::*;

/// The on-disk formats of raw files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawFormat {
    Delimited,
    Sqlite,
    JsonLines,
}

impl RawFormat {
    /// Determines the format from the file extension; `None` for
    /// unsupported files.
    pub(crate) fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(OsStr::to_str)?
            .to_lowercase();

        match ext.as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Delimited),
            "db" | "sqlite" | "sqlite3" => Some(Self::Sqlite),
            "jsonl" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// A single row of a raw file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawRecord {
    /// The (1-based) position of the record within its file.
    pub(crate) row: usize,
    values: Vec<String>,
}

impl RawRecord {
    pub(crate) fn new(row: usize, values: Vec<String>) -> Self {
        Self { row, values }
    }

    #[inline]
    pub(crate) fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }
}

/// The records of a raw file, including the ones that couldn't be
/// read. Malformed records are kept (as errors) so that they can be
/// reported in file order.
#[derive(Debug, Default)]
pub(crate) struct RawTable {
    columns: Vec<String>,
    records: Vec<ClaimsetResult<RawRecord>>,
}

impl RawTable {
    #[inline]
    pub(crate) fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub(crate) fn records(&self) -> &[ClaimsetResult<RawRecord>] {
        &self.records
    }

    /// Returns the index of the column `name` (case-insensitive).
    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.columns
            .iter()
            .position(|col| col.trim().eq_ignore_ascii_case(name))
    }

    #[inline]
    pub(crate) fn valid(&self) -> impl Iterator<Item = &RawRecord> {
        self.records.iter().filter_map(|r| r.as_ref().ok())
    }

    #[inline]
    pub(crate) fn num_malformed(&self) -> usize {
        self.records.iter().filter(|r| r.is_err()).count()
    }

    /// Returns the distinct values of a column.
    pub(crate) fn distinct(&self, idx: usize) -> BTreeSet<String> {
        self.valid()
            .filter_map(|record| record.get(idx))
            .map(|value| value.trim().to_string())
            .collect()
    }

    /// Returns up to `n` evenly spaced valid records.
    pub(crate) fn sample(&self, n: usize) -> Vec<&RawRecord> {
        let valid: Vec<_> = self.valid().collect();
        if n == 0 || valid.is_empty() {
            return vec![];
        }

        let step = (valid.len() / n).max(1);
        valid.into_iter().step_by(step).take(n).collect()
    }

    /// Reads a delimited text file. Unless `delimiter` is given, it is
    /// sniffed from the header line.
    pub(crate) fn from_delimited<R: Read>(
        mut reader: R,
        delimiter: Option<u8>,
    ) -> ClaimsetResult<Self> {
        let mut data = vec![];
        reader.read_to_end(&mut data)?;

        let delimiter = delimiter.unwrap_or_else(|| {
            let header =
                data.split(|b| *b == b'\n').next().unwrap_or(&[]);
            sniff_delimiter(header)
        });

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_slice());

        let columns: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();

        let records = reader
            .byte_records()
            .enumerate()
            .map(|(idx, result)| {
                let row = idx + 1;
                let record = result
                    .map_err(|e| ClaimsetError::malformed(row, e))?;

                if record.len() != columns.len() {
                    return Err(ClaimsetError::malformed(
                        row,
                        format!(
                            "expected {} fields, found {}",
                            columns.len(),
                            record.len()
                        ),
                    ));
                }

                let values = record
                    .iter()
                    .map(|v| String::from_utf8_lossy(v).into_owned())
                    .collect();

                Ok(RawRecord::new(row, values))
            })
            .collect();

        Ok(Self { columns, records })
    }

    /// Reads a JSON Lines file. The columns are the keys of the first
    /// object; missing keys yield empty values.
    pub(crate) fn from_json_lines<R: Read>(
        reader: R,
    ) -> ClaimsetResult<Self> {
        let mut columns: Vec<String> = vec![];
        let mut records = vec![];
        let mut row = 0;

        for line in BufReader::new(reader).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            row += 1;
            let object = match serde_json::from_str::<Value>(&line) {
                Ok(Value::Object(object)) => object,
                Ok(_) => {
                    records.push(Err(ClaimsetError::malformed(
                        row,
                        "expected a JSON object",
                    )));
                    continue;
                }
                Err(e) => {
                    records.push(Err(ClaimsetError::malformed(row, e)));
                    continue;
                }
            };

            if columns.is_empty() {
                columns = object.keys().cloned().collect();
            }

            let values = columns
                .iter()
                .map(|col| match object.get(col) {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s.clone(),
                    Some(value) => value.to_string(),
                })
                .collect();

            records.push(Ok(RawRecord::new(row, values)));
        }

        Ok(Self { columns, records })
    }

    /// Reads all rows of a table of a SQLite database.
    pub(crate) fn from_sqlite<P: AsRef<Path>>(
        path: P,
        table: &str,
    ) -> ClaimsetResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY,
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM \"{}\"",
            table.replace('"', "\"\"")
        ))?;

        let columns: Vec<String> =
            stmt.column_names().into_iter().map(String::from).collect();

        let mut records = vec![];
        let mut rows = stmt.query([])?;
        let mut row_no = 0;

        while let Some(row) = rows.next()? {
            row_no += 1;

            let values: Result<Vec<String>, String> = (0..columns.len())
                .map(|idx| {
                    let value =
                        row.get_ref(idx).map_err(|e| e.to_string())?;
                    sqlite_value_to_string(value)
                })
                .collect();

            records.push(
                values
                    .map(|values| RawRecord::new(row_no, values))
                    .map_err(|e| ClaimsetError::malformed(row_no, e)),
            );
        }

        Ok(Self { columns, records })
    }
}

/// Lists the tables of a SQLite database.
pub(crate) fn sqlite_tables<P: AsRef<Path>>(
    path: P,
) -> ClaimsetResult<Vec<String>> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY,
    )?;
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' \
        ORDER BY name",
    )?;

    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(tables)
}

/// Reads a delimited text or JSON Lines file.
pub(crate) fn read_text_file<P: AsRef<Path>>(
    path: P,
    format: RawFormat,
    delimiter: Option<u8>,
) -> ClaimsetResult<RawTable> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ClaimsetError::InputNotFound(path.into()));
    }

    let file = fs::File::open(path)?;
    match format {
        RawFormat::Delimited => {
            RawTable::from_delimited(file, delimiter)
        }
        RawFormat::JsonLines => RawTable::from_json_lines(file),
        RawFormat::Sqlite => {
            bail!("{} is not a text file", path.display())
        }
    }
}

fn sqlite_value_to_string(
    value: ValueRef<'_>,
) -> Result<String, String> {
    match value {
        ValueRef::Null => Ok(String::new()),
        ValueRef::Integer(i) => Ok(i.to_string()),
        ValueRef::Real(f) => Ok(f.to_string()),
        ValueRef::Text(s) => {
            Ok(String::from_utf8_lossy(s).into_owned())
        }
        ValueRef::Blob(_) => Err("unexpected binary value".into()),
    }
}

/// Guesses the delimiter of a header line: a comma, unless the line
/// has no comma but a semicolon or a tab.
pub(crate) fn sniff_delimiter(header: &[u8]) -> u8 {
    if header.contains(&b',') {
        b','
    } else if header.contains(&b';') {
        b';'
    } else if header.contains(&b'\t') {
        b'\t'
    } else {
        b','
    }
}
