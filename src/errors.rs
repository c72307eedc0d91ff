use thiserror::Error;

/// HTTP error classification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HttpErrorKind {
    #[error("Client error: {message}")]
    Client { message: String },
    #[error("Server error: {message}")]
    Server { message: String },
}

/// Why a single prediction cycle produced no probability.
///
/// Every variant is recovered inside the cycle that raised it: the controller
/// logs it and leaves the chart untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// The request never produced a response (connect, DNS, body read, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("HTTP error (status {status}): {kind}")]
    Http { status: u16, kind: HttpErrorKind },

    /// The body parsed but carried no usable probability
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl PredictionError {
    /// Create an HTTP error, classified by status range
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = if (400..500).contains(&status) {
            HttpErrorKind::Client { message }
        } else {
            HttpErrorKind::Server { message }
        };
        PredictionError::Http { status, kind }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        PredictionError::Transport(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        PredictionError::MalformedResponse(msg.into())
    }

    /// Short label for structured logs.
    pub fn kind_str(&self) -> &'static str {
        match self {
            PredictionError::Transport(_) => "transport",
            PredictionError::Http { .. } => "http_status",
            PredictionError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// Crate-level error type for setup and configuration.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A required input control is not configured
    #[error("Missing input control: {0}")]
    MissingInput(String),

    /// A slider name that matches no known control
    #[error("Unknown slider: '{0}'")]
    UnknownSlider(String),

    /// A slider definition cannot be used
    #[error("Invalid slider '{name}': {reason}")]
    InvalidSlider { name: String, reason: String },

    /// Rolling series capacity must be positive
    #[error("Invalid series capacity: {0}")]
    InvalidCapacity(usize),

    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Logging could not be initialised
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn invalid_slider(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidSlider {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
