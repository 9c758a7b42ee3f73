use crate::error::{Result, TransferError};

/// Address of one version of a package: `subject/repo/package/version`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionCoord {
    pub subject: String,
    pub repo: String,
    pub package: String,
    pub version: String,
}

impl VersionCoord {
    /// Parse exactly four non-empty path segments.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim_matches('/').split('/').collect();
        if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
            return Err(TransferError::Pattern(format!(
                "expected subject/repo/package/version, got '{s}'"
            )));
        }
        Ok(Self {
            subject: parts[0].into(),
            repo: parts[1].into(),
            package: parts[2].into(),
            version: parts[3].into(),
        })
    }

    /// Remote content prefix for files belonging to this version's repo,
    /// as served by the download server.
    pub fn repo_prefix(&self) -> String {
        format!("{}/{}", self.subject, self.repo)
    }
}

/// Address of one file on the download server: `subject/repo/path...`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePath {
    pub subject: String,
    pub repo: String,
    pub path: String,
}

impl FilePath {
    /// Parse at least three non-empty path segments; everything after the
    /// repo is the file path.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim_matches('/');
        let mut parts = trimmed.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(subject), Some(repo), Some(path))
                if !subject.is_empty() && !repo.is_empty() && !path.is_empty() =>
            {
                Ok(Self {
                    subject: subject.into(),
                    repo: repo.into(),
                    path: path.into(),
                })
            }
            _ => Err(TransferError::Pattern(format!(
                "expected subject/repo/file-path, got '{s}'"
            ))),
        }
    }

    /// Full path on the download server.
    pub fn remote_path(&self) -> String {
        format!("{}/{}/{}", self.subject, self.repo, self.path)
    }
}
