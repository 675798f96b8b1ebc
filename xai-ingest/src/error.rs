use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid file format: {file_name} is not a .csv file")]
    InvalidFormat { file_name: String },

    #[error("File too large: {size_bytes} bytes exceeds the {max_bytes} byte limit")]
    TooLarge { size_bytes: u64, max_bytes: u64 },

    #[error("Empty file: {file_name} contains no data")]
    EmptyFile { file_name: String },

    #[error("Failed to read file: {message}")]
    ReadFailure { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::ReadFailure {
            message: err.to_string(),
        }
    }
}

impl IngestError {
    /// True for the rejections an upload attempt can end with. These are shown
    /// to the user verbatim and never retried.
    pub fn is_upload_rejection(&self) -> bool {
        matches!(
            self,
            IngestError::InvalidFormat { .. }
                | IngestError::TooLarge { .. }
                | IngestError::EmptyFile { .. }
                | IngestError::ReadFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_rejections_carry_specific_messages() {
        let err = IngestError::TooLarge {
            size_bytes: 200,
            max_bytes: 100,
        };
        assert_eq!(
            err.to_string(),
            "File too large: 200 bytes exceeds the 100 byte limit"
        );

        let err = IngestError::InvalidFormat {
            file_name: "data.txt".to_string(),
        };
        assert!(err.to_string().contains("data.txt"));
        assert!(err.is_upload_rejection());
    }

    #[test]
    fn io_errors_map_to_read_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: IngestError = io.into();
        assert!(matches!(err, IngestError::ReadFailure { .. }));
    }

    #[test]
    fn storage_errors_are_not_upload_rejections() {
        let err = IngestError::StorageError {
            message: "quota exceeded".to_string(),
        };
        assert!(!err.is_upload_rejection());
    }
}
