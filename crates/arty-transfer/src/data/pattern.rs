/// A user-supplied path expression, owned by the CLI layer and read-only
/// input to the matcher.
#[derive(Clone, Debug)]
pub struct PathPattern {
    pub raw: String,
    /// Interpret `raw` as a regular expression instead of a wildcard.
    pub regex: bool,
    /// Match entries below the first directory level.
    pub recursive: bool,
}

impl PathPattern {
    pub fn wildcard(raw: impl Into<String>, recursive: bool) -> Self {
        Self {
            raw: raw.into(),
            regex: false,
            recursive,
        }
    }

    pub fn regex(raw: impl Into<String>, recursive: bool) -> Self {
        Self {
            raw: raw.into(),
            regex: true,
            recursive,
        }
    }
}
