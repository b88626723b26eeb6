use std::path::PathBuf;

pub(crate) type ClaimsetResult<T> = Result<T, ClaimsetError>;

macro_rules! bail {
    ($($arg:tt)*) => {{
        return Err(ClaimsetError::Other(format!($($arg)*)));
    }};
}

pub(crate) use bail;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ClaimsetError {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("malformed record (row = {row}): {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("unable to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

impl ClaimsetError {
    #[inline]
    pub(crate) fn other<T: ToString>(s: T) -> Self {
        Self::Other(s.to_string())
    }

    #[inline]
    pub(crate) fn malformed<T: ToString>(
        row: usize,
        reason: T,
    ) -> Self {
        Self::MalformedRecord {
            row,
            reason: reason.to_string(),
        }
    }

    /// Wraps a failed write to `path`.
    ///
    /// CSV errors carrying an I/O error are unwrapped, so that a full
    /// disk is reported the same way regardless of the writer.
    pub(crate) fn write_failure<P, E>(path: P, err: E) -> Self
    where
        P: Into<PathBuf>,
        E: Into<ClaimsetError>,
    {
        let source = match err.into() {
            Self::IO(e) => e,
            Self::Csv(e) if e.is_io_error() => match e.into_kind() {
                csv::ErrorKind::Io(e) => e,
                _ => unreachable!(),
            },
            e => std::io::Error::other(e.to_string()),
        };

        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }
}
