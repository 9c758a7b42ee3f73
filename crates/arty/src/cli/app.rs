use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[command(name="arty",version=env!("CARGO_PKG_VERSION"),about="Client for a binary-artifact hosting service",long_about=None,propagate_version=true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "u", name = "upload", about = "Upload files into a package version")]
    Upload(UploadArg),
    #[command(alias = "dlf", name = "download-file", about = "Download a single file")]
    DownloadFile(DownloadFileArg),
    #[command(
        alias = "dlv",
        name = "download-ver",
        about = "Download the files of a package version"
    )]
    DownloadVer(DownloadVerArg),
}

/// Connection flags shared by every command, each with an environment
/// fallback.
#[derive(Args, Clone, Debug)]
pub struct AuthArg {
    #[arg(long, help = "User name, falls back to ARTY_USER")]
    pub user: Option<String>,
    #[arg(long, help = "API key, falls back to ARTY_KEY")]
    pub key: Option<String>,
    #[arg(long, help = "API endpoint, falls back to ARTY_API_URL")]
    pub api_url: Option<String>,
    #[arg(
        long,
        help = "Download server, falls back to ARTY_DOWNLOAD_URL, then to the API endpoint"
    )]
    pub download_url: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct UploadArg {
    #[arg(help = "Local path expression, wildcard by default")]
    pub pattern: String,
    #[arg(help = "Target: subject/repo/package/version, optionally followed by a path")]
    pub target: String,

    #[command(flatten)]
    pub auth: AuthArg,

    #[arg(long, default_value_t = 3, help = "Number of concurrent workers")]
    pub threads: usize,
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true",
        help = "Collect files from sub-folders as well"
    )]
    pub recursive: bool,
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true",
        help = "Upload to the target path without the source hierarchy"
    )]
    pub flat: bool,
    #[arg(long, help = "Interpret the path expression as a regular expression")]
    pub regexp: bool,
    #[arg(long, help = "Resolve and report every file without uploading")]
    pub dry_run: bool,
    #[arg(long, help = "Publish the uploaded files")]
    pub publish: bool,
    #[arg(
        long = "override",
        help = "Overwrite already published files"
    )]
    pub override_existing: bool,
    #[arg(long, help = "Ask the server to extract the uploaded archive")]
    pub explode: bool,
}

#[derive(Args, Clone, Debug)]
pub struct DownloadFileArg {
    #[arg(help = "Remote file: subject/repo/path")]
    pub path: String,

    #[command(flatten)]
    pub auth: AuthArg,
    #[command(flatten)]
    pub split: SplitArg,

    #[arg(long, default_value_t = 3, help = "Number of concurrent workers")]
    pub threads: usize,
    #[arg(long, help = "Download without the remote hierarchy")]
    pub flat: bool,
}

#[derive(Args, Clone, Debug)]
pub struct DownloadVerArg {
    #[arg(help = "Source version: subject/repo/package/version")]
    pub target: String,
    #[arg(default_value = "*", help = "Remote path expression, wildcard by default")]
    pub pattern: String,

    #[command(flatten)]
    pub auth: AuthArg,
    #[command(flatten)]
    pub split: SplitArg,

    #[arg(long, default_value_t = 3, help = "Number of concurrent workers")]
    pub threads: usize,
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true",
        help = "Match files below the first directory level"
    )]
    pub recursive: bool,
    #[arg(long, help = "Download without the remote hierarchy")]
    pub flat: bool,
    #[arg(long, help = "Interpret the path expression as a regular expression")]
    pub regexp: bool,
}

/// Split-download tuning, downloads only.
#[derive(Args, Clone, Debug)]
pub struct SplitArg {
    #[arg(
        long = "min-split",
        default_value_t = 5120,
        allow_hyphen_values = true,
        help = "Minimum file size in KB to split, -1 disables splitting"
    )]
    pub min_split: i64,
    #[arg(
        long = "split-count",
        default_value_t = 3,
        allow_hyphen_values = true,
        help = "Number of parts a split download is divided into, at most 15"
    )]
    pub split_count: i32,
}
