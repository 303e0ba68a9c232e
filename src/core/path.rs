//! Purpose: Validate and carry hierarchical collection paths.
//! Exports: `StorePath`.
//! Role: Keep client and test path semantics aligned from one source.
//! Invariants: A path is never empty; segments are non-empty and use the key alphabet.
//! Invariants: Rendering joins segments with `/` and never adds a trailing slash.

use crate::core::error::{Error, ErrorKind};
use crate::core::keys::is_key_char;
use std::fmt;

/// A validated hierarchical address naming a collection of records.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// Parses a slash-delimited path such as `"reports/daily"`.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Self::from_segments(raw.split('/'))
    }

    pub fn from_segments<I, S>(segments: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(Error::new(ErrorKind::Usage).with_message("path must not be empty"));
        }
        for segment in &segments {
            if segment.is_empty() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("path segment must not be empty")
                    .with_path(segments.join("/")));
            }
            if let Some(c) = segment.chars().find(|c| !is_key_char(*c)) {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(format!("illegal path character {c:?}"))
                    .with_path(segments.join("/")));
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::StorePath;
    use crate::core::error::ErrorKind;

    #[test]
    fn parse_splits_segments() {
        let path = StorePath::parse("reports/daily").expect("path");
        assert_eq!(path.segments(), ["reports", "daily"]);
        assert_eq!(path.to_string(), "reports/daily");
    }

    #[test]
    fn parse_single_segment() {
        let path = StorePath::parse("users").expect("path");
        assert_eq!(path.segments(), ["users"]);
    }

    #[test]
    fn parse_rejects_empty() {
        let err = StorePath::parse("").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn parse_rejects_empty_segment() {
        let err = StorePath::parse("reports//daily").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn parse_rejects_trailing_slash() {
        let err = StorePath::parse("reports/").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn parse_rejects_sentinel_in_segment() {
        let err = StorePath::parse("rep|orts").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn from_segments_rejects_embedded_slash() {
        let err = StorePath::from_segments(["a/b"]).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}
