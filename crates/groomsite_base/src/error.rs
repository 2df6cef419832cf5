use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # How errors are structured
A single error type is shared by every groomsite crate.
ErrorKind carries the structural information callers match on (which file, which address),
GroomsiteError wraps it with a context stack, an optional cause and the span trace captured
at construction time.
 */

/// Error variants that can occur in groomsite operations.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Binding a listening socket failed
    Bind {
        address: String,
        source: std::io::Error,
    },

    /// Multiple errors occurred during batch operations
    Multiple {
        errors: Vec<GroomsiteError>,
        count: usize,
    },

    /// Catch-all for other errors with a message
    Message { message: String },
}

pub struct GroomsiteError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<GroomsiteError>>,
    span_trace: SpanTrace,
}

impl GroomsiteError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    pub fn file_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(ErrorKind::FileError {
            path: path.into(),
            source,
        })
    }

    /// Attaches context to an error.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records the error that led to this one.
    pub fn caused_by(mut self, cause: GroomsiteError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    pub fn cause(&self) -> Option<&GroomsiteError> {
        self.cause.as_deref()
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// True if this error (or its cause chain) is a bind failure because the address is taken.
    pub fn is_address_in_use(&self) -> bool {
        match &self.kind {
            ErrorKind::Bind { source, .. }
                if source.kind() == std::io::ErrorKind::AddrInUse =>
            {
                true
            }
            _ => self
                .cause
                .as_ref()
                .is_some_and(|cause| cause.is_address_in_use()),
        }
    }

    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    fn fmt_kind(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path.display(), source)
            }
            ErrorKind::Bind { address, source } => {
                write!(f, "Failed to bind {}: {}", address, source)
            }
            ErrorKind::Multiple { errors, count } => {
                write!(f, "Multiple errors occurred ({} total)", count)?;
                if let Some(first) = errors.first() {
                    write!(f, ": {}", first)?;
                }
                Ok(())
            }
            ErrorKind::Message { message } => write!(f, "{}", message),
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        self.fmt_kind(f)?;
        writeln!(f)?;
        let entries = self.context.len() + usize::from(self.cause.is_some());
        for (index, context) in self.context.iter().enumerate() {
            let branch = if index + 1 == entries { "└─" } else { "├─" };
            writeln!(f, "{indent}{branch} {context}")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "{indent}└─ cause: ")?;
            cause.fmt_tree(f, &format!("{indent}   "))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for GroomsiteError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for GroomsiteError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::Bind { source, .. } => Some(source),
            ErrorKind::Multiple { .. } | ErrorKind::Message { .. } => self
                .cause
                .as_deref()
                .map(|cause| cause as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for GroomsiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for context in &self.context {
            write!(f, "{}: ", context)?;
        }
        self.fmt_kind(f)
    }
}

impl fmt::Debug for GroomsiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/// Standard result type for groomsite operations.
pub type GroomsiteResult<T> = std::result::Result<T, Box<GroomsiteError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> GroomsiteResult<T>;

    /// Context is only evaluated if the result is an error.
    fn with_context<F>(self, f: F) -> GroomsiteResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for GroomsiteResult<T> {
    fn context(self, context: impl Into<String>) -> GroomsiteResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> GroomsiteResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Creates a boxed message error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::error::GroomsiteError::message(format!($($arg)*)))
    };
}

/// Returns early with a boxed message error.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}

impl From<std::io::Error> for Box<GroomsiteError> {
    fn from(error: std::io::Error) -> Self {
        Box::new(GroomsiteError::message(error.to_string()))
    }
}
