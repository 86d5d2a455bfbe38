//! # ytbatch
//!
//! Turns a plain text file of YouTube links into a single playlist.
//!
//! ## How it works
//!
//! Every line that looks like a watch URL (`...watch?v=<id>`) or a short
//! URL (`youtu.be/<id>`) contributes its video ID. The IDs are sent to
//! YouTube's `watch_videos` endpoint in one request, which redirects to an
//! anonymous playlist. That playlist's ID is read back out of the final
//! URL.
//!
//! ## Example
//!
//! ```
//! use ytbatch::{playlist, resolve::HttpResolver, Config};
//!
//! // ...
//!
//! let config = Config::default();
//! let id = ytbatch::playlist_from_file(&config, &HttpResolver::default()).await?;
//! playlist::launch(&id.url())?;
//! ```

use std::{path::PathBuf, time::Duration};

use log::debug;

pub mod error;
pub mod playlist;
pub mod query;
pub mod resolve;

pub use error::Error;
use playlist::PlaylistId;
use query::Query;
use resolve::Resolve;

/// Link file read when none is given.
pub const DEFAULT_INPUT: &str = "yt.list";

/// Everything a single run needs to know.
#[derive(Debug, Clone)]
pub struct Config {
    /// File of video links, one per line.
    pub input: PathBuf,

    /// Batch endpoint the IDs are sent to.
    pub endpoint: String,

    /// Upper bound on the whole playlist request, redirects included.
    pub timeout: Duration,

    /// Redirects followed before the request counts as failed.
    pub max_redirects: usize,

    /// Cut IDs at the first `&`, `?` or `#`.
    pub trim: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            endpoint: query::DEFAULT_ENDPOINT.to_string(),
            timeout: resolve::DEFAULT_TIMEOUT,
            max_redirects: resolve::DEFAULT_MAX_REDIRECTS,
            trim: false,
        }
    }
}

/// Read the link file named by `config` and have `resolver` turn it into a
/// playlist.
pub async fn playlist_from_file<R>(config: &Config, resolver: &R) -> Result<PlaylistId, Error>
where
    R: Resolve + ?Sized,
{
    let query = Query::from_file(&config.input, config.trim).await?;
    let batch_url = query.batch_url(&config.endpoint);
    debug!("Batch request for {} videos: {}", query.len(), batch_url);
    resolve::resolve_playlist(resolver, &batch_url).await
}
