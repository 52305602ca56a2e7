use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    DuplicateName,
    ConstViolation,
    ParseError,
    InvalidTag,
    BufferTooSmall,
    NotInitialized,
    AlreadyInitialized,
    InvalidArgument,
    Usage,
    Io,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::DuplicateName => "DuplicateName",
            ErrorKind::ConstViolation => "ConstViolation",
            ErrorKind::ParseError => "ParseError",
            ErrorKind::InvalidTag => "InvalidTag",
            ErrorKind::BufferTooSmall => "BufferTooSmall",
            ErrorKind::NotInitialized => "NotInitialized",
            ErrorKind::AlreadyInitialized => "AlreadyInitialized",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::Usage => "Usage",
            ErrorKind::Io => "Io",
            ErrorKind::Internal => "Internal",
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    name: Option<String>,
    hint: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            name: None,
            hint: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Variable name the failing operation referred to, when there was one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.as_str())?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(name) = &self.name {
            write!(f, " (name: {name})")?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Negative return code used by the exported C functions.
pub fn to_abi_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::NotFound => -1,
        ErrorKind::DuplicateName => -2,
        ErrorKind::ConstViolation => -3,
        ErrorKind::ParseError => -4,
        ErrorKind::InvalidTag => -5,
        ErrorKind::BufferTooSmall => -6,
        ErrorKind::NotInitialized => -7,
        ErrorKind::AlreadyInitialized => -8,
        ErrorKind::InvalidArgument => -9,
        ErrorKind::Usage => -10,
        ErrorKind::Io => -11,
        ErrorKind::Internal => -12,
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::InvalidArgument | ErrorKind::Usage => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::DuplicateName => 4,
        ErrorKind::ConstViolation => 5,
        ErrorKind::ParseError => 6,
        ErrorKind::InvalidTag => 7,
        ErrorKind::BufferTooSmall => 8,
        ErrorKind::NotInitialized => 9,
        ErrorKind::AlreadyInitialized => 10,
        ErrorKind::Io => 11,
    }
}
