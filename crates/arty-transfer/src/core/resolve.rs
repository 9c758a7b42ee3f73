use std::path::PathBuf;

/// Compute the remote path for an uploaded file.
///
/// With `flat` the directory hierarchy is discarded and only the file name
/// lands under the target prefix. Without `flat`, a target ending in `/`
/// (or an empty target) preserves the full relative path under the matched
/// root, reproducing the local hierarchy remotely. A non-empty target that
/// does not end in `/` names the remote file verbatim (explicit rename).
pub fn upload_target(target: &str, rel: &str, flat: bool) -> String {
    if !target.is_empty() && !target.ends_with('/') {
        return target.to_string();
    }
    let suffix = if flat {
        rel.rsplit('/').next().unwrap_or(rel)
    } else {
        rel
    };
    format!("{target}{suffix}")
}

/// Compute the local path for a downloaded file, relative to the working
/// directory. `flat` drops the remote directory structure.
pub fn download_target(remote_rel: &str, flat: bool) -> PathBuf {
    if flat {
        PathBuf::from(remote_rel.rsplit('/').next().unwrap_or(remote_rel))
    } else {
        PathBuf::from(remote_rel)
    }
}
