//! Resolution of a batch request into the playlist YouTube generates for it.
//!
//! YouTube answers a `watch_videos` request with a chain of redirects, the
//! last of which points at a URL carrying `list=<playlist ID>`.

use std::time::Duration;

use async_trait::async_trait;
use hyper::{
    client::HttpConnector,
    header::{LOCATION, USER_AGENT},
    Body, Client, Request,
};
use hyper_tls::HttpsConnector;
use log::{debug, info};
use url::Url;

use crate::{playlist::PlaylistId, Error};

/// Marker preceding the playlist ID in a resolved URL.
const LIST_MARKER: &str = "list=";

const AGENT: &str = concat!("ytbatch/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

#[async_trait]
/// Something that can follow a URL to its final destination.
pub trait Resolve: Send + Sync {
    /// Final URL reached from `url`, after every redirect.
    async fn resolve(&self, url: &str) -> Result<String, Error>;
}

/// Resolves over HTTP(S), following redirects by hand so the number of
/// hops stays bounded.
pub struct HttpResolver {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    timeout: Duration,
    max_redirects: usize,
}

impl HttpResolver {
    pub fn new(timeout: Duration, max_redirects: usize) -> Self {
        let https = HttpsConnector::new();
        Self {
            client: Client::builder().build::<_, Body>(https),
            timeout,
            max_redirects,
        }
    }

    async fn follow(&self, url: &str) -> Result<String, Error> {
        let mut current = Url::parse(url).map_err(|e| Error::network(format!("{}: {}", url, e)))?;

        for _ in 0..=self.max_redirects {
            let req = Request::get(current.as_str())
                .header(USER_AGENT, AGENT)
                .body(Body::empty())?;
            let res = self.client.request(req).await?;
            let status = res.status();
            debug!("{} <- {}", status, current);

            if status.is_redirection() {
                let location = res
                    .headers()
                    .get(LOCATION)
                    .and_then(|l| l.to_str().ok())
                    .ok_or_else(|| {
                        Error::network(format!("{} from {} without a location", status, current))
                    })?;
                current = current
                    .join(location)
                    .map_err(|e| Error::network(format!("bad location {}: {}", location, e)))?;
                continue;
            }

            if !status.is_success() {
                return Err(Error::network(format!("{} from {}", status, current)));
            }
            return Ok(current.to_string());
        }

        Err(Error::network(format!(
            "gave up after {} redirects",
            self.max_redirects
        )))
    }
}

impl Default for HttpResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_MAX_REDIRECTS)
    }
}

#[async_trait]
impl Resolve for HttpResolver {
    async fn resolve(&self, url: &str) -> Result<String, Error> {
        tokio::time::timeout(self.timeout, self.follow(url))
            .await
            .map_err(|_| Error::network(format!("no answer within {:?}", self.timeout)))?
    }
}

/// Pull the playlist ID out of a resolved URL. The ID runs from the first
/// `list=` up to the next parameter or fragment.
pub fn playlist_id(resolved: &str) -> Result<PlaylistId, Error> {
    let malformed = || Error::MalformedPlaylistResponse {
        resolved: resolved.to_string(),
    };

    let (_, rest) = resolved.split_once(LIST_MARKER).ok_or_else(malformed)?;
    let id = rest.split(&['&', '#'][..]).next().unwrap_or_default();
    if id.is_empty() {
        return Err(malformed());
    }
    Ok(PlaylistId::new(id))
}

/// Send the batch request and read back the playlist it produced.
pub async fn resolve_playlist<R>(resolver: &R, batch_url: &str) -> Result<PlaylistId, Error>
where
    R: Resolve + ?Sized,
{
    info!("Requesting {}", batch_url);
    let resolved = resolver.resolve(batch_url).await?;
    debug!("Resolved to {}", resolved);
    playlist_id(&resolved)
}
