use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Dataset;

/// Storage key the metadata record is written under.
pub const METADATA_KEY: &str = "datasetMetadata";

/// Row-less projection of a [`Dataset`], persisted so the explore step can
/// still show columns and counts after the row cache is gone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub file_name: String,
    pub headers: Vec<String>,
    pub upload_time: DateTime<Utc>,
    pub file_size_bytes: u64,
    pub total_rows: usize,
    pub has_data: bool,
}

impl From<&Dataset> for DatasetMetadata {
    fn from(dataset: &Dataset) -> Self {
        Self {
            file_name: dataset.file_name.clone(),
            headers: dataset.headers.clone(),
            upload_time: dataset.upload_time,
            file_size_bytes: dataset.file_size_bytes,
            total_rows: dataset.total_rows,
            has_data: true,
        }
    }
}

impl DatasetMetadata {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Row;

    #[test]
    fn serializes_with_exact_field_names() {
        let dataset = Dataset {
            file_name: "titanic.csv".to_string(),
            headers: vec!["age".to_string(), "fare".to_string()],
            rows: vec![Row {
                row_id: 1,
                values: vec!["22".to_string(), "7.25".to_string()],
            }],
            upload_time: Utc::now(),
            file_size_bytes: 17,
            total_rows: 1,
        };

        let json = DatasetMetadata::from(&dataset).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "fileName",
                "fileSizeBytes",
                "hasData",
                "headers",
                "totalRows",
                "uploadTime"
            ]
        );
        assert_eq!(object["hasData"], serde_json::Value::Bool(true));
        assert_eq!(object["totalRows"], serde_json::Value::from(1));
    }

    #[test]
    fn parses_back_what_it_writes() {
        let metadata = DatasetMetadata {
            file_name: "a.csv".to_string(),
            headers: vec!["x".to_string()],
            upload_time: Utc::now(),
            file_size_bytes: 3,
            total_rows: 0,
            has_data: true,
        };
        let parsed = DatasetMetadata::from_json(&metadata.to_json().unwrap()).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn rejects_records_missing_fields() {
        let result = DatasetMetadata::from_json(r#"{"fileName":"a.csv","hasData":true}"#);
        assert!(result.is_err());
    }
}
