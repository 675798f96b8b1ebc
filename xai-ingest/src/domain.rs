use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::DatasetMetadata;

/// Key under which the synthetic row number appears in a record. Kept apart
/// from the header namespace so a CSV column named `id` survives untouched.
pub const ROW_ID_KEY: &str = "__row_id";

const SAMPLE_FILE_NAME: &str = "titanic_sample.csv";
const SAMPLE_HEADERS: [&str; 6] = ["id", "age", "sex", "embarked", "fare", "survived"];
const SAMPLE_ROWS: [[&str; 6]; 8] = [
    ["1", "22", "male", "S", "7.25", "0"],
    ["2", "38", "female", "C", "71.28", "1"],
    ["3", "26", "female", "S", "7.92", "1"],
    ["4", "35", "female", "S", "53.1", "1"],
    ["5", "35", "male", "S", "8.05", "0"],
    ["6", "54", "male", "S", "51.86", "0"],
    ["7", "2", "male", "S", "21.08", "0"],
    ["8", "27", "female", "S", "11.13", "1"],
];

/// One data line of an uploaded CSV. `values` is aligned with the owning
/// dataset's headers and always has the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub row_id: usize,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub upload_time: DateTime<Utc>,
    pub file_size_bytes: u64,
    pub total_rows: usize,
}

impl Dataset {
    /// File name without its extension, as shown in page titles.
    pub fn display_name(&self) -> &str {
        match self.file_name.rfind('.') {
            Some(idx) if idx > 0 => &self.file_name[..idx],
            _ => &self.file_name,
        }
    }

    /// Position of a header. Repeated names resolve to the last occurrence.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().rposition(|h| h == header)
    }

    pub fn value<'a>(&self, row: &'a Row, header: &str) -> Option<&'a str> {
        let idx = self.column_index(header)?;
        row.values.get(idx).map(String::as_str)
    }

    /// Header-keyed view of a row, plus the synthetic row number under
    /// [`ROW_ID_KEY`]. Cell values stay raw strings.
    pub fn record(&self, row: &Row) -> Map<String, Value> {
        let mut record = Map::with_capacity(self.headers.len() + 1);
        for (header, value) in self.headers.iter().zip(row.values.iter()) {
            record.insert(header.clone(), Value::String(value.clone()));
        }
        record.insert(ROW_ID_KEY.to_string(), Value::from(row.row_id));
        record
    }

    /// Row data was lost (volatile cache reset) while the metadata still
    /// reports rows. Distinct from a dataset that is genuinely empty.
    pub fn is_degraded(&self) -> bool {
        self.total_rows > 0 && self.rows.is_empty()
    }

    /// Display-only shell rebuilt from durable metadata. Rows are never
    /// persisted, so the shell carries none.
    pub fn from_metadata(metadata: DatasetMetadata) -> Self {
        Self {
            file_name: metadata.file_name,
            headers: metadata.headers,
            rows: Vec::new(),
            upload_time: metadata.upload_time,
            file_size_bytes: metadata.file_size_bytes,
            total_rows: metadata.total_rows,
        }
    }

    /// Built-in Titanic excerpt shown when neither tier holds a dataset.
    pub fn sample() -> Self {
        let headers: Vec<String> = SAMPLE_HEADERS.iter().map(|h| h.to_string()).collect();
        let rows: Vec<Row> = SAMPLE_ROWS
            .iter()
            .enumerate()
            .map(|(idx, values)| Row {
                row_id: idx + 1,
                values: values.iter().map(|v| v.to_string()).collect(),
            })
            .collect();

        let file_size_bytes = std::iter::once(SAMPLE_HEADERS.join(","))
            .chain(SAMPLE_ROWS.iter().map(|r| r.join(",")))
            .map(|line| line.len() as u64 + 1)
            .sum();

        Self {
            file_name: SAMPLE_FILE_NAME.to_string(),
            headers,
            total_rows: rows.len(),
            rows,
            upload_time: Utc::now(),
            file_size_bytes,
        }
    }
}
