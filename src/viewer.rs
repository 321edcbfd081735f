use std::path::Path;
use std::process::Command;

use anyhow::Result;
use tracing::debug;

use crate::errors::BenchplotError;

/// Platform viewer used when the config does not name one.
pub fn default_viewer() -> &'static str {
    if cfg!(target_os = "macos") {
        "open -W"
    } else if cfg!(windows) {
        "cmd /C start /WAIT"
    } else {
        "xdg-open"
    }
}

/// Build the viewer invocation: the whitespace-split viewer string followed by
/// the image path.
pub fn viewer_command(viewer: &str, image: &Path) -> Option<Command> {
    let mut parts = viewer.split_whitespace();
    let program = parts.next()?;
    let mut cmd = Command::new(program);
    cmd.args(parts).arg(image);
    Some(cmd)
}

/// Open `image` and block until the viewer process exits.
pub fn show(image: &Path, viewer: Option<&str>) -> Result<()> {
    let viewer = viewer.unwrap_or(default_viewer());
    let failed = |detail: String| BenchplotError::ViewerFailed {
        viewer: viewer.to_string(),
        path: image.to_path_buf(),
        detail,
    };

    let mut cmd = viewer_command(viewer, image).ok_or_else(|| failed("empty viewer command".to_string()))?;
    debug!(?cmd, "launching viewer");

    let status = cmd.status().map_err(|e| failed(e.to_string()))?;
    if !status.success() {
        return Err(failed(format!("exited with {}", status)).into());
    }
    Ok(())
}
