use anyhow::Result;

pub mod app;
mod context;
mod download;
mod report;
mod upload;

pub use app::App;
use app::Commands;

/// Dispatch one parsed invocation and return the process exit code.
pub fn run(app: App) -> Result<i32> {
    match app.cmd {
        Commands::Upload(arg) => upload::upload(arg),
        Commands::DownloadFile(arg) => download::download_file(arg),
        Commands::DownloadVer(arg) => download::download_version(arg),
    }
}
