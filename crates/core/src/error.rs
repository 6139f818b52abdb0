#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to build inference HTTP client: {0}")]
    HttpClientBuild(reqwest::Error),
    #[error("inference request failed: {0}")]
    InferenceTransport(reqwest::Error),
    #[error("inference gateway returned status {status}: {body}")]
    InferenceStatus { status: u16, body: String },
    #[error("inference gateway response was malformed: {0}")]
    InferenceResponse(String),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("record store lock poisoned")]
    StorePoisoned,
}

impl AssessmentError {
    /// True for failures of the external inference gateway.
    pub fn is_inference(&self) -> bool {
        matches!(
            self,
            AssessmentError::InferenceTransport(_)
                | AssessmentError::InferenceStatus { .. }
                | AssessmentError::InferenceResponse(_)
        )
    }
}

pub type AssessmentResult<T> = std::result::Result<T, AssessmentError>;
