use thiserror::Error;

/// Core error types for cpaudit
///
/// Every variant is fatal for the run: the tool never prints a partial report.
#[derive(Debug, Error)]
pub enum Error {
    /// An export file could not be read
    #[error("Cannot read {what} export {path}: {source}")]
    ReadExport {
        what: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input file did not contain a top-level JSON array
    #[error("{what} export must be a JSON array of records")]
    NotAnArray { what: &'static str },

    /// A single object record could not be decoded
    #[error("Object record #{index} ({uid}) could not be decoded: {source}")]
    ObjectDecode {
        index: usize,
        uid: String,
        #[source]
        source: serde_json::Error,
    },

    /// A single access rule record could not be decoded
    #[error("Access rule record #{index} could not be decoded: {source}")]
    RuleDecode {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Host carries an IPv4 address that does not parse
    #[error("Object {uid} has an invalid IPv4 address: {value:?}")]
    InvalidAddress { uid: String, value: String },

    /// Network carries a subnet/prefix pair that does not form a CIDR range
    #[error("Object {uid} has an invalid subnet {subnet}/{mask}: {reason}")]
    InvalidSubnet {
        uid: String,
        subnet: String,
        mask: u32,
        reason: String,
    },

    /// Target name is not present in the name index
    #[error("Target not found: {0}")]
    UnknownTarget(String),

    /// Target name is shared by more than one object
    #[error("Target name {name:?} is ambiguous ({} objects share it)", uids.len())]
    AmbiguousTarget { name: String, uids: Vec<String> },

    /// An identifier referenced by a group or rule is missing from the catalog
    #[error("Unknown object {uid} referenced by {referenced_by}")]
    UnknownObject { uid: String, referenced_by: String },

    /// Configuration file could not be used
    #[error("Configuration error in {path}: {message}")]
    Config { path: String, message: String },
}

/// Represents a translated error with helpful context
#[derive(Debug, Clone)]
pub struct ErrorTranslation {
    pub user_message: String,
    pub suggestions: Vec<String>,
}

impl ErrorTranslation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            user_message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

impl Error {
    /// Maps an error to a user-facing message and the most likely fixes.
    pub fn translate(&self) -> ErrorTranslation {
        match self {
            Error::ReadExport { what, path, source } => {
                let flag = if *what == ACL_EXPORT { "--acls" } else { "--objs" };
                match source.kind() {
                    std::io::ErrorKind::NotFound => {
                        ErrorTranslation::new(format!("{what} export not found: {path}"))
                            .with_suggestion(format!("Check the path given to {flag}"))
                    }
                    std::io::ErrorKind::PermissionDenied => {
                        ErrorTranslation::new(format!("{what} export is not readable: {path}"))
                            .with_suggestion(format!("Check file permissions on the file given to {flag}"))
                    }
                    _ => ErrorTranslation::new(self.to_string())
                        .with_suggestion(format!("Check the file given to {flag}")),
                }
            }
            Error::Serialization(_) | Error::NotAnArray { .. } => {
                ErrorTranslation::new(self.to_string())
                    .with_suggestion("Export objects and rules as JSON arrays")
                    .with_suggestion("Verify the file was not truncated during transfer")
            }
            Error::ObjectDecode { .. } | Error::RuleDecode { .. } => {
                ErrorTranslation::new(self.to_string())
                    .with_suggestion("The export is malformed; re-export it from the management server")
                    .with_suggestion("Partial exports are not audited to avoid incomplete results")
            }
            Error::InvalidAddress { .. } | Error::InvalidSubnet { .. } => {
                ErrorTranslation::new(self.to_string())
                    .with_suggestion("Use dotted IPv4 notation, e.g. 10.0.0.0")
                    .with_suggestion("IPv4 prefix lengths must be between 0 and 32")
            }
            Error::UnknownTarget(_) => ErrorTranslation::new(self.to_string())
                .with_suggestion("Object names are case-sensitive")
                .with_suggestion("Use --uid to select the target by identifier"),
            Error::AmbiguousTarget { uids, .. } => {
                let mut translation = ErrorTranslation::new(self.to_string())
                    .with_suggestion("Re-run with --uid and one of the identifiers below");
                for uid in uids {
                    translation = translation.with_suggestion(format!("--uid {uid}"));
                }
                translation
            }
            Error::UnknownObject { .. } => ErrorTranslation::new(self.to_string())
                .with_suggestion("Export objects and rules from the same policy package")
                .with_suggestion("Include referenced objects in the object export (details-level full)"),
            Error::Config { .. } => ErrorTranslation::new(self.to_string())
                .with_suggestion("Run `cpaudit --print-config` to see the expected format"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Export names used in [`Error::ReadExport`] and [`Error::NotAnArray`].
pub const OBJECT_EXPORT: &str = "Object";
pub const ACL_EXPORT: &str = "ACL";
