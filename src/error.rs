use thiserror::Error;

/// Every failure the query and mutation engine can report.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("unknown filter field '{0}'")]
    UnknownFilterField(String),

    #[error("invalid value '{value}' for filter '{field}': {reason}")]
    InvalidFilterValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("path identifier '{path}' does not match body identifier {body:?}")]
    IdentifierMismatch { path: String, body: Option<String> },

    #[error("invalid value {value} for '{field}', expected one of: {allowed}")]
    InvalidEnumValue {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("no {resource} record found with {key} '{id}'")]
    NotFound {
        resource: String,
        key: String,
        id: String,
    },

    /// Raw driver message, never sent to clients
    #[error("store error: {0}")]
    Store(String),
}

/// Boundary-facing classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownResource,
    UnknownFilterField,
    InvalidFilterValue,
    InvalidParameter,
    IdentifierMismatch,
    InvalidEnumValue,
    NotFound,
    StoreError,
}

impl ErrorKind {
    pub fn status(&self) -> u16 {
        match self {
            ErrorKind::UnknownFilterField
            | ErrorKind::InvalidFilterValue
            | ErrorKind::InvalidParameter
            | ErrorKind::IdentifierMismatch
            | ErrorKind::InvalidEnumValue => 400,
            ErrorKind::UnknownResource | ErrorKind::NotFound => 404,
            ErrorKind::StoreError => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnknownResource => "unknown_resource",
            ErrorKind::UnknownFilterField => "unknown_filter_field",
            ErrorKind::InvalidFilterValue => "invalid_filter_value",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::IdentifierMismatch => "identifier_mismatch",
            ErrorKind::InvalidEnumValue => "invalid_enum_value",
            ErrorKind::NotFound => "not_found",
            ErrorKind::StoreError => "store_error",
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::UnknownResource(_) => ErrorKind::UnknownResource,
            CoreError::UnknownFilterField(_) => ErrorKind::UnknownFilterField,
            CoreError::InvalidFilterValue { .. } => ErrorKind::InvalidFilterValue,
            CoreError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            CoreError::IdentifierMismatch { .. } => ErrorKind::IdentifierMismatch,
            CoreError::InvalidEnumValue { .. } => ErrorKind::InvalidEnumValue,
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Store(_) => ErrorKind::StoreError,
        }
    }

    /// Message safe to return to clients. Store failures are reduced to a
    /// fixed description; everything else is the error's own text.
    pub fn client_message(&self) -> String {
        match self {
            CoreError::Store(_) => "database operation failed".to_string(),
            other => other.to_string(),
        }
    }

    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::Store(format!("{:#}", err))
    }
}
