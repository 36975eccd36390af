use rusoto_core::RusotoError;
use thiserror::Error;

/// EC2 error codes that mean the caller's credentials were rejected.
const AUTH_FAILURE_CODES: &[&str] = &[
    "AuthFailure",
    "UnauthorizedOperation",
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "OptInRequired",
];

#[derive(Error, Debug)]
pub enum Error {
    #[error("authentication with the compute API failed: {0}")]
    Authentication(String),
    #[error("{operation} failed: {message}")]
    Provider {
        operation: &'static str,
        message: String,
    },
    #[error("{0} could not be found")]
    NotFound(String),
    #[error("expected exactly one {what}, found {count}")]
    AmbiguousResult { what: String, count: usize },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("unknown region {region:?}")]
    Region { region: String },
    #[error("couldn't read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing yaml")]
    Yaml(#[from] serde_yaml::Error),
    #[error("couldn't create the HTTP client")]
    Tls(#[from] rusoto_core::request::TlsError),
}

impl Error {
    /// Stable identifier used in the binary's error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Authentication(_) => "authentication",
            Error::Provider { .. } | Error::Tls(_) => "provider",
            Error::NotFound(_) => "not_found",
            Error::AmbiguousResult { .. } => "ambiguous_result",
            Error::Config(_) | Error::Region { .. } | Error::Io { .. } | Error::Yaml(_) => "config",
        }
    }

    pub(crate) fn from_rusoto<E>(operation: &'static str, error: RusotoError<E>) -> Self
    where
        E: std::error::Error + 'static,
    {
        match error {
            RusotoError::Credentials(e) => Error::Authentication(e.to_string()),
            RusotoError::Unknown(ref response) => {
                let body = String::from_utf8_lossy(&response.body);
                let status = response.status.as_u16();
                let code = error_code(&body);
                if status == 401 || AUTH_FAILURE_CODES.iter().any(|auth| body.contains(auth)) {
                    Error::Authentication(format!("{} returned {}: {}", operation, status, body))
                } else if let Some(code) = code.filter(|code| code.ends_with(".NotFound")) {
                    Error::NotFound(format!("{}: {}", operation, code))
                } else {
                    Error::Provider {
                        operation,
                        message: format!("status {}: {}", status, body),
                    }
                }
            }
            other => Error::Provider {
                operation,
                message: other.to_string(),
            },
        }
    }
}

/// The `<Code>` element of an EC2 XML error body, e.g. `InvalidVolume.NotFound`.
fn error_code(body: &str) -> Option<&str> {
    let start = body.find("<Code>")? + "<Code>".len();
    let end = body[start..].find("</Code>")? + start;
    Some(body[start..end].trim())
}
