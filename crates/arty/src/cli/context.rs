use anyhow::{Result, bail};
use arty_transfer::RepoContext;

use crate::cli::app::AuthArg;

const ENV_USER: &str = "ARTY_USER";
const ENV_KEY: &str = "ARTY_KEY";
const ENV_API_URL: &str = "ARTY_API_URL";
const ENV_DOWNLOAD_URL: &str = "ARTY_DOWNLOAD_URL";

/// Resolve connection details from flags, falling back to the environment.
/// Flags win over environment variables; the download server falls back to
/// the API endpoint.
pub fn build(arg: &AuthArg) -> Result<RepoContext> {
    let user = pick(arg.user.as_deref(), ENV_USER).unwrap_or_default();
    let Some(key) = pick(arg.key.as_deref(), ENV_KEY) else {
        bail!("no API key given, use --key or set {ENV_KEY}");
    };
    let Some(api_url) = pick(arg.api_url.as_deref(), ENV_API_URL) else {
        bail!("no API endpoint given, use --api-url or set {ENV_API_URL}");
    };
    let download_url =
        pick(arg.download_url.as_deref(), ENV_DOWNLOAD_URL).unwrap_or_else(|| api_url.clone());

    Ok(RepoContext::new(api_url, download_url, user, key))
}

fn pick(flag: Option<&str>, env: &str) -> Option<String> {
    flag.filter(|s| !s.is_empty())
        .map(str::to_owned)
        .or_else(|| std::env::var(env).ok().filter(|s| !s.is_empty()))
}
