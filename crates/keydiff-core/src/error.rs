use crate::upsert::Stage;
use derive_more::Display;
use thiserror::Error as ThisError;

/// Boxed caller error carried through callback failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

///
/// Error
///
/// Public error type with a stable kind taxonomy. Reconciliation performs no
/// retries and no suppression; every error is fatal to the call that raised
/// it.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("missing required argument: {0}")]
    MissingArgument(Argument),

    #[error("{stage} callback failed: {source}")]
    Callback {
        stage: Stage,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Return the stable kind for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingArgument(_) => ErrorKind::InvalidArgument,
            Self::Callback { .. } => ErrorKind::Callback,
        }
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A required argument was never supplied to the orchestrator.
    InvalidArgument,

    /// A caller-provided callback failed; the source error is preserved.
    Callback,
}

///
/// Argument
///
/// Required orchestrator inputs that can be absent at execution time.
/// Callback arguments are required parameters of the terminal methods and
/// cannot be absent.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum Argument {
    #[display("existing")]
    Existing,

    #[display("key_of_existing")]
    KeyOfExisting,

    #[display("key_of_supplied")]
    KeyOfSupplied,

    #[display("supplied")]
    Supplied,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_argument_names_the_offending_parameter() {
        let err = Error::MissingArgument(Argument::KeyOfSupplied);

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "missing required argument: key_of_supplied");
    }

    #[test]
    fn callback_errors_preserve_the_source_chain() {
        let source: BoxError = "store rejected the row".into();
        let err = Error::Callback {
            stage: Stage::Update,
            source,
        };

        assert_eq!(err.kind(), ErrorKind::Callback);
        assert_eq!(
            err.to_string(),
            "update callback failed: store rejected the row"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
