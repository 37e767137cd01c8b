use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Length of every valid video identifier.
pub const VIDEO_ID_LEN: usize = 11;

/// An eleven character YouTube video identifier.
///
/// Only [`extract`] constructs one, so holding a `VideoId` means the
/// length invariant already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// One pattern per recognized URL shape. Each captures the maximal run of
// characters up to the next URL delimiter; the length check happens
// afterwards so near-miss tokens are rejected rather than truncated.
static SHORT_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"youtu\.be/([^#&?/]+)").unwrap());
static EMBED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"embed/([^#&?/]+)").unwrap());
static USER_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/u/\w/([^#&?/]+)").unwrap());
static LEGACY_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/v/([^#&?/]+)").unwrap());
static WATCH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]v=([^#&?/]+)").unwrap());

/// Extract the video identifier from a candidate URL.
///
/// Returns `None` for unrelated or malformed input and for candidates
/// whose token is not exactly [`VIDEO_ID_LEN`] characters long.
pub fn extract(url: &str) -> Option<VideoId> {
    let shapes = [&SHORT_LINK, &EMBED, &USER_PATH, &LEGACY_PATH, &WATCH];

    for shape in shapes {
        if let Some(captures) = shape.captures(url) {
            let candidate = &captures[1];
            if candidate.len() == VIDEO_ID_LEN {
                return Some(VideoId(candidate.to_owned()));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    fn extracted(url: &str) -> Option<String> {
        extract(url).map(|id| id.as_str().to_owned())
    }

    #[test]
    fn watch_url() {
        assert_eq!(
            extracted("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some(ID.into())
        );
    }

    #[test]
    fn watch_url_with_trailing_params() {
        assert_eq!(
            extracted("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=43s&list=RD123"),
            Some(ID.into())
        );
    }

    #[test]
    fn watch_url_with_leading_params() {
        assert_eq!(
            extracted("https://www.youtube.com/watch?feature=shared&v=dQw4w9WgXcQ"),
            Some(ID.into())
        );
    }

    #[test]
    fn short_link() {
        assert_eq!(extracted("https://youtu.be/dQw4w9WgXcQ"), Some(ID.into()));
    }

    #[test]
    fn short_link_with_params() {
        assert_eq!(
            extracted("https://youtu.be/dQw4w9WgXcQ?si=abcdef"),
            Some(ID.into())
        );
    }

    #[test]
    fn embed_url() {
        assert_eq!(
            extracted("https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0"),
            Some(ID.into())
        );
    }

    #[test]
    fn legacy_v_path() {
        assert_eq!(
            extracted("https://www.youtube.com/v/dQw4w9WgXcQ"),
            Some(ID.into())
        );
    }

    #[test]
    fn user_path() {
        assert_eq!(
            extracted("https://www.youtube.com/u/w/dQw4w9WgXcQ"),
            Some(ID.into())
        );
    }

    #[test]
    fn fragment_terminates_token() {
        assert_eq!(
            extracted("https://youtu.be/dQw4w9WgXcQ#t=30"),
            Some(ID.into())
        );
    }

    #[test]
    fn rejects_short_token() {
        assert_eq!(extracted("https://www.youtube.com/watch?v=short"), None);
    }

    #[test]
    fn rejects_long_token() {
        assert_eq!(
            extracted("https://www.youtube.com/watch?v=dQw4w9WgXcQtoolong"),
            None
        );
    }

    #[test]
    fn rejects_empty_token() {
        assert_eq!(extracted("https://www.youtube.com/watch?v="), None);
    }

    #[test]
    fn rejects_unrelated_url() {
        assert_eq!(extracted("https://example.com/some/page"), None);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(extracted("not a url at all"), None);
        assert_eq!(extracted(""), None);
    }
}
