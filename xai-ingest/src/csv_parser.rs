//! Line-oriented CSV reader for uploaded datasets.
//!
//! Fields are split on every comma and literal double quotes are dropped, so a
//! quoted value containing a comma will shift the columns after it. Cell
//! values are kept as raw strings; no type inference happens here.

use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::domain::{Dataset, Row};
use crate::error::IngestError;

/// 150 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 150 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_upload_bytes: u64,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn has_csv_extension(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".csv")
}

/// Checks that can run before the file body is read.
pub fn validate_upload(
    file_name: &str,
    size_bytes: u64,
    limits: &ParseLimits,
) -> Result<(), IngestError> {
    if !has_csv_extension(file_name) {
        return Err(IngestError::InvalidFormat {
            file_name: file_name.to_string(),
        });
    }

    if size_bytes > limits.max_upload_bytes {
        return Err(IngestError::TooLarge {
            size_bytes,
            max_bytes: limits.max_upload_bytes,
        });
    }

    Ok(())
}

fn split_fields(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split(',').map(|field| field.trim().replace('"', ""))
}

pub fn parse_csv(
    text: &str,
    file_name: &str,
    size_bytes: u64,
    limits: &ParseLimits,
) -> Result<Dataset, IngestError> {
    validate_upload(file_name, size_bytes, limits)?;

    // Spreadsheet exports often lead with a UTF-8 byte-order mark.
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());

    let header_line = lines.next().ok_or_else(|| IngestError::EmptyFile {
        file_name: file_name.to_string(),
    })?;
    let headers: Vec<String> = split_fields(header_line).collect();

    let mut seen = HashSet::with_capacity(headers.len());
    for header in &headers {
        if !seen.insert(header.as_str()) {
            warn!(
                "Header '{}' repeats in {}; lookups by name use the last occurrence",
                header, file_name
            );
        }
    }

    let width = headers.len();
    let mut rows = Vec::new();
    let mut truncated = 0usize;

    for (idx, line) in lines.enumerate() {
        let mut values: Vec<String> = split_fields(line).collect();
        if values.len() > width {
            truncated += 1;
            values.truncate(width);
        } else {
            values.resize(width, String::new());
        }
        rows.push(Row {
            row_id: idx + 1,
            values,
        });
    }

    if truncated > 0 {
        debug!(
            "Dropped extra trailing fields from {} rows of {}",
            truncated, file_name
        );
    }

    info!(
        "Parsed {}: {} columns, {} rows, {} bytes",
        file_name,
        width,
        rows.len(),
        size_bytes
    );

    Ok(Dataset {
        file_name: file_name.to_string(),
        headers,
        total_rows: rows.len(),
        rows,
        upload_time: Utc::now(),
        file_size_bytes: size_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Dataset, IngestError> {
        parse_csv(text, "data.csv", text.len() as u64, &ParseLimits::default())
    }

    #[test]
    fn parses_headers_and_rows() {
        let ds = parse("id,age,sex\n1,22,male\n2,,female\n").unwrap();

        assert_eq!(ds.headers, vec!["id", "age", "sex"]);
        assert_eq!(ds.total_rows, 2);
        assert_eq!(ds.rows.len(), 2);
        assert_eq!(ds.rows[0].values, vec!["1", "22", "male"]);
        assert_eq!(ds.rows[1].values, vec!["2", "", "female"]);
        assert_eq!(ds.rows[1].row_id, 2);
        assert_eq!(ds.file_size_bytes, 31);
    }

    #[test]
    fn header_fields_are_trimmed_and_unquoted() {
        let ds = parse(" \"name\" , age ,\"home town\"\n").unwrap();
        assert_eq!(ds.headers, vec!["name", "age", "home town"]);
    }

    #[test]
    fn leading_byte_order_mark_is_dropped() {
        let ds = parse("\u{FEFF}id,age\n1,22\n").unwrap();
        assert_eq!(ds.headers, vec!["id", "age"]);
        assert_eq!(ds.column_index("id"), Some(0));
        assert_eq!(ds.value(&ds.rows[0], "id"), Some("1"));

        let err = parse("\u{FEFF}\n\n").unwrap_err();
        assert!(matches!(err, IngestError::EmptyFile { .. }));
    }

    #[test]
    fn blank_lines_do_not_leave_id_gaps() {
        let ds = parse("\n\na,b\n\n1,2\n   \n3,4\r\n\r\n5,6\n\n").unwrap();

        assert_eq!(ds.total_rows, 3);
        let ids: Vec<usize> = ds.rows.iter().map(|r| r.row_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(ds.rows[1].values, vec!["3", "4"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let ds = parse("a,b,c\n1\n").unwrap();
        assert_eq!(ds.rows[0].values, vec!["1", "", ""]);
    }

    #[test]
    fn long_rows_are_truncated() {
        let ds = parse("a,b\n1,2,3,4\n").unwrap();
        assert_eq!(ds.rows[0].values, vec!["1", "2"]);
    }

    #[test]
    fn embedded_quotes_are_stripped_not_parsed() {
        let ds = parse("name,city\n\"Smith, John\",Oslo\n").unwrap();
        assert_eq!(ds.rows[0].values, vec!["Smith", "John"]);
    }

    #[test]
    fn header_only_file_has_zero_rows() {
        let ds = parse("a,b,c\n").unwrap();
        assert_eq!(ds.headers.len(), 3);
        assert_eq!(ds.total_rows, 0);
        assert!(ds.rows.is_empty());
    }

    #[test]
    fn blank_only_file_is_empty() {
        let err = parse("\n   \n\t\n").unwrap_err();
        assert!(matches!(err, IngestError::EmptyFile { .. }));

        let err = parse("").unwrap_err();
        assert!(matches!(err, IngestError::EmptyFile { .. }));
    }

    #[test]
    fn extension_is_checked_case_insensitively() {
        let limits = ParseLimits::default();
        assert!(parse_csv("a\n1\n", "DATA.CSV", 4, &limits).is_ok());

        let err = parse_csv("a\n1\n", "data.txt", 4, &limits).unwrap_err();
        assert!(matches!(err, IngestError::InvalidFormat { .. }));

        let err = parse_csv("a\n1\n", "csv", 4, &limits).unwrap_err();
        assert!(matches!(err, IngestError::InvalidFormat { .. }));
    }

    #[test]
    fn reported_size_over_limit_is_rejected() {
        let limits = ParseLimits {
            max_upload_bytes: 10,
        };
        assert!(parse_csv("a\n1\n", "data.csv", 10, &limits).is_ok());

        let err = parse_csv("a\n1\n", "data.csv", 11, &limits).unwrap_err();
        assert!(matches!(
            err,
            IngestError::TooLarge {
                size_bytes: 11,
                max_bytes: 10
            }
        ));
    }

    #[test]
    fn default_limit_is_150_mib() {
        assert_eq!(ParseLimits::default().max_upload_bytes, 157_286_400);
    }
}
