//! Centralized error types for dbcheck.
//!
//! Uses `thiserror` for ergonomic error definitions. Each variant belongs to one layer of
//! the check (configuration, connectivity, schema, seed workflow, subprocess launch) and
//! carries a stable code for log filtering.

/// Core error type shared by the database layer, the workflow and the runner.
#[derive(Debug, thiserror::Error)]
pub enum DbCheckError {
    // === Configuration errors ===
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // === Connectivity ===
    #[error("Database connection failed: {0}")]
    Connectivity(#[source] sqlx::Error),

    // === Schema ===
    #[error("Failed to materialize table '{table}': {source}")]
    Schema {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    // === Seed workflow ===
    #[error("Step '{step}' failed: {message}")]
    Workflow { step: &'static str, message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Credential hashing failed: {message}")]
    Credential { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // === Runner ===
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl DbCheckError {
    /// Error code string for log filtering and the failure banner.
    pub fn error_code(&self) -> &str {
        match self {
            Self::MissingDatabaseUrl => "MISSING_DATABASE_URL",
            Self::InvalidConfig { .. } | Self::Config(_) => "CONFIG_ERROR",
            Self::Connectivity(_) => "CONNECTIVITY_ERROR",
            Self::Schema { .. } => "SCHEMA_ERROR",
            Self::Workflow { .. } => "WORKFLOW_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Credential { .. } => "CREDENTIAL_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Launch { .. } => "LAUNCH_ERROR",
        }
    }

    /// Configuration problems are detected before any database call is made.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingDatabaseUrl | Self::InvalidConfig { .. } | Self::Config(_)
        )
    }

    /// Shorthand for a failed workflow step.
    pub fn workflow(step: &'static str, message: impl Into<String>) -> Self {
        Self::Workflow {
            step,
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results using DbCheckError.
pub type DbCheckResult<T> = Result<T, DbCheckError>;
