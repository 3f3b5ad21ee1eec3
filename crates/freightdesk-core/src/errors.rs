use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("sort=[field_name, ASC/DESC] order must be 'ASC' or 'DESC', got '{0}'")]
    InvalidSortDirection(String),
    #[error("invalid filter: {0}")]
    MalformedFilter(String),
    #[error("invalid sort: {0}")]
    MalformedSort(String),
    #[error("invalid range: {0}")]
    MalformedRange(String),
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
    #[error("registration error: {0}")]
    Registration(String),
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error("executor error: {0}")]
    Executor(String),
}

impl QueryError {
    /// True when the request itself was at fault rather than the backend.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Registration(_) | Self::Executor(_))
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
