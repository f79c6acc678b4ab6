use thiserror::Error;
use yangkit_core_types::RequestId;

/// Result type alias using YangkitError
pub type Result<T> = std::result::Result<T, YangkitError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Decode
    ProtocolMismatch,
    UnexpectedElement,
    InvalidPayload,

    // Tree structure
    FilterNotRooted,
    NotFound,
    InvalidInput,

    // Integration
    Serialization,
    ExternalService,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::ProtocolMismatch => "ERR_PROTOCOL_MISMATCH",
            ExErrorKind::UnexpectedElement => "ERR_UNEXPECTED_ELEMENT",
            ExErrorKind::InvalidPayload => "ERR_INVALID_PAYLOAD",
            ExErrorKind::FilterNotRooted => "ERR_FILTER_NOT_ROOTED",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus optional context
/// (operation, entity path, request id) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for entity tree, codec and RPC operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum YangkitError {
    // ===== Decode Errors =====
    /// Payload root element does not name the expected top-level entity
    #[error("Top entity '{expected}' does not match the payload root '{found}'")]
    ProtocolMismatch { expected: String, found: String },

    /// Payload element has no declared leaf or child on the target entity
    #[error("Wrong payload! No element '{element}' found in '{container}'")]
    UnexpectedElement { element: String, container: String },

    /// Payload is not a well-formed document
    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    // ===== Tree Errors =====
    /// Filter's parent chain never reaches a top-level entity
    #[error("Could not traverse from filter '{path}' up to a top-level entity")]
    FilterNotRooted { path: String },

    /// Entity handle does not address a live entity in this tree
    #[error("Unknown entity handle: {id}")]
    UnknownEntity { id: usize },

    /// Leaf name is not declared on the entity
    #[error("Leaf '{leaf}' is not declared in '{container}'")]
    UnknownLeaf { leaf: String, container: String },

    /// Child name is not declared on the entity
    #[error("Child '{child}' is not declared in '{container}'")]
    UnknownChild { child: String, container: String },

    // ===== Integration Errors =====
    /// Serialization error (XML/JSON/TOML encoding or decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The external session or path runtime failed
    #[error("Session error: {message}")]
    Session { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<YangkitError> for ExError {
    fn from(err: YangkitError) -> Self {
        match err {
            YangkitError::ProtocolMismatch { expected, found } => {
                ExError::new(ExErrorKind::ProtocolMismatch)
                    .with_op("decode")
                    .with_path(expected)
                    .with_message(format!("Payload root is '{}'", found))
            }

            YangkitError::UnexpectedElement { element, container } => {
                ExError::new(ExErrorKind::UnexpectedElement)
                    .with_op("decode")
                    .with_path(container)
                    .with_message(format!("No element '{}' declared", element))
            }

            YangkitError::InvalidPayload { message } => {
                ExError::new(ExErrorKind::InvalidPayload).with_message(message)
            }

            YangkitError::FilterNotRooted { path } => ExError::new(ExErrorKind::FilterNotRooted)
                .with_path(path)
                .with_message("Filter is not rooted at a top-level entity"),

            YangkitError::UnknownEntity { id } => ExError::new(ExErrorKind::NotFound)
                .with_message(format!("Unknown entity handle {}", id)),

            YangkitError::UnknownLeaf { leaf, container } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_path(container)
                    .with_message(format!("Leaf '{}' is not declared", leaf))
            }

            YangkitError::UnknownChild { child, container } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_path(container)
                    .with_message(format!("Child '{}' is not declared", child))
            }

            YangkitError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            YangkitError::Session { message } => {
                ExError::new(ExErrorKind::ExternalService).with_message(message)
            }

            YangkitError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for YangkitError {
    fn from(err: serde_json::Error) -> Self {
        YangkitError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for YangkitError {
    fn from(err: toml::de::Error) -> Self {
        YangkitError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<roxmltree::Error> for YangkitError {
    fn from(err: roxmltree::Error) -> Self {
        YangkitError::InvalidPayload {
            message: err.to_string(),
        }
    }
}
