mod app;
mod config;
mod domain;
mod infra;
mod logging;
mod ui;
mod usecase;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::error;

fn main() {
    logging::init_tracing(std::env::args().any(|arg| arg == "--verbose"));

    let webview_data_dir = match default_webview_data_dir() {
        Ok(dir) => dir,
        Err(err) => {
            error!("failed to prepare webview data directory: {err:#}");
            std::process::exit(1);
        }
    };

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("propdash"))
                .with_data_directory(webview_data_dir),
        )
        .launch(app::App);
}

fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

fn default_webview_data_dir() -> Result<PathBuf> {
    let project_dirs = config::project_dirs()?;
    ensure_webview_data_dir(project_dirs.data_local_dir())
}
