use thiserror::Error;

/// Result type alias using the canonical ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code. Only `Connection`, `Config`,
/// `InvalidInput` and the persistence kinds (`Persistence`, `Io`,
/// `Serialization`) are fatal to a run; the per-entity kinds are recovered
/// into the snapshot as error-shaped entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Startup
    InvalidInput,
    Config,
    Connection,

    // Per-entity fetch
    NotFound,
    Query,
    Timeout,
    MalformedResponse,

    // Persistence
    Io,
    Serialization,
    Persistence,
    /// A persisted snapshot file does not have the expected entry schema
    InvalidSnapshot,

    // Run control
    Interrupted,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Connection => "ERR_CONNECTION",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Query => "ERR_QUERY",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::MalformedResponse => "ERR_MALFORMED_RESPONSE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::InvalidSnapshot => "ERR_INVALID_SNAPSHOT",
            ExErrorKind::Interrupted => "ERR_INTERRUPTED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the context
/// needed to diagnose a failed export: the operation, the entity being
/// processed and the underlying message from the database or filesystem.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The message if one was recorded, otherwise the stable code
    pub fn detail(&self) -> &str {
        if self.message.is_empty() {
            self.code()
        } else {
            &self.message
        }
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
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
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised by the snapshot pipeline
///
/// The `Display` text of `EntityNotFound` and `FetchFailed` is exactly what
/// ends up in the `error` field of an error-shaped snapshot entry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The entity disappeared between enumeration and fetch
    #[error("{entity} not found")]
    EntityNotFound { entity: String, entity_id: String },

    /// Any infrastructure failure while fetching one entity
    #[error("Failed to fetch data: {message}")]
    FetchFailed { entity_id: String, message: String },

    /// A label or property name that cannot be safely placed in a query
    #[error("Invalid {field} '{value}': expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier { field: String, value: String },

    /// A row that does not have the columns or shapes the query promises
    #[error("Malformed row: {reason}")]
    MalformedRow { reason: String },

    /// The run was cancelled before every entity was processed
    #[error("Run interrupted after {processed} of {total} entities")]
    Interrupted { processed: usize, total: usize },
}

impl From<PipelineError> for ExError {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        match err {
            PipelineError::EntityNotFound { entity_id, .. } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_op("fetch_entity")
                    .with_entity_id(entity_id)
                    .with_message(message)
            }
            PipelineError::FetchFailed { entity_id, .. } => ExError::new(ExErrorKind::Query)
                .with_op("fetch_entity")
                .with_entity_id(entity_id)
                .with_message(message),
            PipelineError::InvalidIdentifier { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            PipelineError::MalformedRow { .. } => {
                ExError::new(ExErrorKind::MalformedResponse).with_message(message)
            }
            PipelineError::Interrupted { .. } => ExError::new(ExErrorKind::Interrupted)
                .with_op("build_snapshot")
                .with_message(message),
        }
    }
}
