// /ws.v1 path construction.
//
// The web service addresses every resource by path: `/ws.v1/<kind>` for
// top-level collections, `/ws.v1/<kind>/<segment>/...` for entity detail
// and relationship sub-collections. Segments are stored decoded and
// percent-encoded only when rendered, so names containing `/`, spaces,
// or non-ASCII survive the round trip.

use std::fmt;

use url::Url;

use crate::error::Error;

/// A decoded path under the `/ws.v1` web service root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WsPath {
    segments: Vec<String>,
}

impl WsPath {
    /// The web service root, `/ws.v1`.
    pub fn root() -> Self {
        Self {
            segments: vec!["ws.v1".to_owned()],
        }
    }

    /// A path rooted at `/ws.v1` with the given segments appended.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path = Self::root();
        path.segments.extend(segments.into_iter().map(Into::into));
        path
    }

    /// Append one decoded segment, returning the extended path.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.segments.push(segment.into());
        path
    }

    /// The decoded segments, including the leading `ws.v1`.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve against a service base URL, percent-encoding each segment.
    pub fn resolve(&self, base: &Url) -> Result<Url, Error> {
        let mut url = base.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidBase(base.to_string()))?;
            parts.pop_if_empty();
            parts.extend(self.segments.iter());
        }
        Ok(url)
    }
}

impl fmt::Display for WsPath {
    /// Renders the percent-encoded path, e.g. `/ws.v1/group/host/a%20b/c`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut url = Url::parse("http://ws.invalid").expect("static base URL");
        url.path_segments_mut()
            .expect("http URL has path segments")
            .extend(self.segments.iter());
        f.write_str(url.path())
    }
}

#[cfg(test)]
mod tests {
    use super::WsPath;

    #[test]
    fn renders_root_and_segments() {
        assert_eq!(WsPath::root().to_string(), "/ws.v1");
        let path = WsPath::new(["group", "host"]).join("dir").join("grp");
        assert_eq!(path.to_string(), "/ws.v1/group/host/dir/grp");
    }

    #[test]
    fn percent_encodes_reserved_characters() {
        let path = WsPath::new(["user"]).join("a b/c?d");
        assert_eq!(path.to_string(), "/ws.v1/user/a%20b%2Fc%3Fd");
    }

    #[test]
    fn resolves_against_base_with_port() {
        let base = url::Url::parse("https://controller:8888").expect("base");
        let url = WsPath::new(["host"]).join("dir").resolve(&base).expect("resolve");
        assert_eq!(url.as_str(), "https://controller:8888/ws.v1/host/dir");
    }
}
