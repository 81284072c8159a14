//! Error handling for the library and CLI.
//!
//! Internally everything is an `anyhow::Error`. When an error leaves a command handler it is
//! tagged with an `ErrorType` so that the operator can tell which part of the system failed.

use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad area of the system in which an error occurred.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The data directory or `config.json` is missing or invalid.
    Config,
    /// Reading or writing the persisted key-value entries failed.
    Storage,
    /// Caller-supplied input was rejected.
    Validation,
    /// The operator is not logged in, or the credentials were wrong.
    Session,
    /// A report artifact could not be produced.
    Export,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// Tags a result with an `ErrorType` before it is returned from a public command.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(format!("{error_type} error")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pub_result_prefixes_error_type() {
        let r: std::result::Result<(), Error> = Err(anyhow::anyhow!("disk full"));
        let e = r.pub_result(ErrorType::Storage).unwrap_err();
        assert_eq!(e.to_string(), "storage error");
        assert_eq!(format!("{e:#}"), "storage error: disk full");
    }

    #[test]
    fn test_pub_result_passes_ok_through() {
        let r: std::result::Result<u8, Error> = Ok(7);
        assert_eq!(r.pub_result(ErrorType::Export).unwrap(), 7);
    }
}
