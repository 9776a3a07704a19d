use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("unknown unit type '{0}'")]
    UnknownUnitType(String),

    #[error("invalid count for {unit}: '{value}' (expected a non-negative integer)")]
    InvalidUnitCount { unit: String, value: String },

    #[error("invalid fleet composition: {0}")]
    InvalidComposition(String),

    #[error("unsupported fleet file format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid {name} '{value}'")]
    InvalidArgument { name: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, SimError>;
