//! The playlist YouTube generated, and handing it off to a browser.

use std::fmt::{self, Display, Formatter};

use log::info;

use crate::Error;

const PLAYLIST_URI: &str = "https://www.youtube.com/playlist?list=";

/// Forces the classic playlist page.
const PLAYLIST_FLAGS: &str = "&disable_polymer=true";

/// Server-assigned playlist ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistId(String);

impl PlaylistId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Where a user can view this playlist.
    pub fn url(&self) -> String {
        format!("{}{}{}", PLAYLIST_URI, self.0, PLAYLIST_FLAGS)
    }
}

impl Display for PlaylistId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Open `url` with the host's default handler. Only the spawn is checked;
/// whether a browser actually shows up is out of our hands.
pub fn launch(url: &str) -> Result<(), Error> {
    info!("Opening {}", url);
    open::that(url).map_err(|source| Error::BrowserLaunchFailure {
        url: url.to_string(),
        source,
    })
}
