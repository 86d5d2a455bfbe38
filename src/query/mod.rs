//! Query resolved by ytbatch.
//!
//! Handles parsing a list of video URLs into the IDs that make up a
//! batch playlist request.

use std::{
    fmt::{self, Display, Formatter},
    path::Path,
    str::FromStr,
};

use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

use crate::Error;

/// Where batch playlist requests are sent by default.
pub const DEFAULT_ENDPOINT: &str = "http://www.youtube.com/watch_videos";

/// A recognized URL shape: a marker that directly precedes the video ID.
#[derive(Debug)]
pub struct Shape {
    pub name: &'static str,
    pub marker: &'static str,
    pattern: Regex,
}

impl Shape {
    fn new(name: &'static str, marker: &'static str) -> Self {
        Self {
            name,
            marker,
            pattern: Regex::new(&format!("{}(.+)", regex::escape(marker))).unwrap(),
        }
    }

    /// Everything after the first occurrence of this shape's marker.
    pub fn capture<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

lazy_static! {
    // Checked in order; the first shape to match a line wins. First
    // capture group is always our video ID.
    static ref SHAPES: Vec<Shape> = vec![
        // https://www.youtube.com/watch?v=aBcDeFGH
        Shape::new("watch", "v="),
        // https://youtu.be/aBcDeFGH
        Shape::new("short", "be/"),
    ];
}

/// Shapes understood by the extractor, in priority order.
pub fn shapes() -> &'static [Shape] {
    &SHAPES
}

/// An opaque video ID, exactly as it appeared after its marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VideoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Match a single line against the shape table.
///
/// With `trim` set, the ID is cut at the first `&`, `?` or `#`, dropping
/// extra parameters such as timestamps.
pub fn extract_id(line: &str, trim: bool) -> Option<VideoId> {
    let line = line.trim();
    let (shape, raw) = SHAPES
        .iter()
        .find_map(|shape| shape.capture(line).map(|raw| (shape, raw)))?;

    let id = if trim {
        raw.split(&['&', '?', '#'][..]).next().unwrap_or_default()
    } else {
        raw
    };
    if id.is_empty() {
        return None;
    }

    debug!("{} link ({}) yields {}", shape.name, shape.marker, id);
    Some(VideoId(id.to_string()))
}

/// Collection of video IDs that make up one batch request, in the order
/// they were listed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query(Vec<VideoId>);

impl Query {
    pub fn parse(text: &str, trim: bool) -> Self {
        Self(text.lines().filter_map(|l| extract_id(l, trim)).collect())
    }

    /// Read and parse a link file. A file without a single recognizable
    /// link is an error, so an empty request never goes out.
    pub async fn from_file<P: AsRef<Path>>(path: P, trim: bool) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::InputNotFound {
                path: path.to_path_buf(),
                source,
            })?;

        let query = Self::parse(&text, trim);
        if query.is_empty() {
            return Err(Error::NoIdentifiersFound {
                path: path.to_path_buf(),
            });
        }
        info!("Found {} videos in {}", query.len(), path.display());
        Ok(query)
    }

    pub fn ids(&self) -> &[VideoId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The batch request URL against `endpoint`.
    pub fn batch_url(&self, endpoint: &str) -> String {
        let ids: Vec<&str> = self.0.iter().map(VideoId::as_str).collect();
        format!("{}?video_ids={}", endpoint, ids.join(","))
    }
}

impl FromStr for Query {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s, false))
    }
}
