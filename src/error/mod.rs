//! Everything that can go wrong between reading the link file and
//! opening the playlist.

use std::{
    error,
    fmt::{self, Display, Formatter},
    io,
    path::PathBuf,
};

#[derive(Debug)]
pub enum Error {
    /// The link file is missing or could not be read.
    InputNotFound { path: PathBuf, source: io::Error },

    /// The link file was read, but no line looked like a video URL.
    NoIdentifiersFound { path: PathBuf },

    /// The batch request failed, timed out, or never settled on a
    /// successful response.
    NetworkFailure(String),

    /// The resolved URL carries no playlist identifier.
    MalformedPlaylistResponse { resolved: String },

    /// The host could not hand the playlist URL to a browser.
    BrowserLaunchFailure { url: String, source: io::Error },
}

impl Error {
    pub(crate) fn network<T: ToString>(reason: T) -> Self {
        Self::NetworkFailure(reason.to_string())
    }

    /// Whether the run should stop here. Only a failed browser launch is
    /// recoverable, since the URL can still be opened by hand.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::BrowserLaunchFailure { .. })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputNotFound { path, source } => {
                write!(f, "could not read {}: {}", path.display(), source)
            }
            Self::NoIdentifiersFound { path } => {
                write!(f, "no video links found in {}", path.display())
            }
            Self::NetworkFailure(reason) => write!(f, "playlist request failed: {}", reason),
            Self::MalformedPlaylistResponse { resolved } => {
                write!(f, "no playlist id in resolved URL {}", resolved)
            }
            Self::BrowserLaunchFailure { url, source } => {
                write!(f, "could not open {} in a browser: {}", url, source)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::InputNotFound { source, .. } | Self::BrowserLaunchFailure { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

impl From<hyper::Error> for Error {
    fn from(e: hyper::Error) -> Self {
        Self::network(e)
    }
}

impl From<hyper::http::Error> for Error {
    fn from(e: hyper::http::Error) -> Self {
        Self::network(e)
    }
}
