//! Error types for TOA
//!
//! Every error is fatal for the running tool. Each variant carries a stable
//! code so that wrappers (scripts, the desktop front end) can tell failures
//! apart without parsing the message.

use std::path::Path;
use thiserror::Error;

/// Result type alias for TOA operations
pub type Result<T> = std::result::Result<T, ToaError>;

/// Main error type for TOA
#[derive(Error, Debug)]
pub enum ToaError {
    /// One or more command-line parameters are missing or invalid
    #[error("This program has wrong parameters.")]
    InvalidParameters,

    #[error("File {path} can not be opened: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File {path} can not be created: {source}")]
    FileCreate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing file {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Wrong number of columns in file {path} at record {record}: expected {expected}, found {found}.")]
    ColumnCount {
        path: String,
        record: u64,
        expected: usize,
        found: usize,
    },

    #[error("Invalid value \"{value}\" of {column} in file {path} at record {record}.")]
    FieldParse {
        path: String,
        record: u64,
        column: &'static str,
        value: String,
    },

    #[error("Wrong format in file {path}: {detail}")]
    FileFormat { path: String, detail: String },

    /// An external program or library failed
    #[error("The module {module} has failed: {message}")]
    Module { module: String, message: String },

    #[error("Connection to the database {path} failed: {message}")]
    DatabaseConnect { path: String, message: String },

    #[error("Database query failed: {message}. SQL: {sql}")]
    DatabaseQuery { sql: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ToaError {
    /// Stable code printed as `*** ERROR <code>: ...`
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameters => "P001",
            Self::FileOpen { .. } => "F001",
            Self::FileCreate { .. } => "F002",
            Self::FileRead { .. } => "F003",
            Self::FileWrite { .. } => "F004",
            Self::ColumnCount { .. } => "F005",
            Self::FieldParse { .. } => "F006",
            Self::FileFormat { .. } => "F007",
            Self::Module { .. } => "M001",
            Self::DatabaseConnect { .. } => "D001",
            Self::DatabaseQuery { .. } => "D002",
            Self::Config(_) => "C001",
        }
    }

    /// Single-line message in the form shown on standard error
    pub fn report(&self) -> String {
        format!("*** ERROR {}: {}", self.code(), self)
    }

    pub fn file_open(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileOpen {
            path: display(path),
            source,
        }
    }

    pub fn file_create(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileCreate {
            path: display(path),
            source,
        }
    }

    pub fn file_read(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: display(path),
            source,
        }
    }

    pub fn file_write(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: display(path),
            source,
        }
    }

    pub fn column_count(path: impl AsRef<Path>, record: u64, expected: usize, found: usize) -> Self {
        Self::ColumnCount {
            path: display(path),
            record,
            expected,
            found,
        }
    }

    pub fn field_parse(
        path: impl AsRef<Path>,
        record: u64,
        column: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::FieldParse {
            path: display(path),
            record,
            column,
            value: value.into(),
        }
    }

    pub fn file_format(path: impl AsRef<Path>, detail: impl Into<String>) -> Self {
        Self::FileFormat {
            path: display(path),
            detail: detail.into(),
        }
    }

    pub fn module(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Module {
            module: module.into(),
            message: message.into(),
        }
    }

    pub fn database_connect(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::DatabaseConnect {
            path: display(path),
            message: message.into(),
        }
    }

    pub fn database_query(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DatabaseQuery {
            sql: sql.into(),
            message: message.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

fn display(path: impl AsRef<Path>) -> String {
    path.as_ref().display().to_string()
}
