use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::debug;

use crate::errors::BenchplotError;

/// File name picked up from the working directory when `--config` is absent.
pub const LOCAL_CONFIG: &str = "benchplot.toml";

/// Upper bound for `facet_width` and `facet_height`, in pixels.
pub const MAX_FACET_PX: u32 = 10_000;

pub const DEFAULT_TEMPLATE: &str = "results/{lang}/release/{prog}/{size}_{col}.txt";

/// Which result files to load and how to plot them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub languages: Vec<String>,
    pub programs: Vec<String>,
    pub sizes: Vec<String>,
    pub collisions: Vec<String>,
    pub path_template: String,
    pub plot: PlotConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    pub x: String,
    pub y: String,
    pub output: PathBuf,
    pub facet_width: u32,
    pub facet_height: u32,
    /// External viewer command. `None` means the platform default.
    pub viewer: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            languages: strings(&["go", "rust"]),
            programs: strings(&["native", "nativeSplit", "ecs"]),
            sizes: strings(&["1000", "5000", "10000"]),
            collisions: strings(&["0"]),
            path_template: DEFAULT_TEMPLATE.to_string(),
            plot: PlotConfig::default(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            x: "Iter".to_string(),
            y: "Time".to_string(),
            output: PathBuf::from("benchplot.svg"),
            facet_width: 400,
            facet_height: 300,
            viewer: None,
        }
    }
}

impl PlotConfig {
    /// Check facet dimensions are within `1..=MAX_FACET_PX`.
    pub fn check_facet_size(&self) -> std::result::Result<(), String> {
        for (name, value) in [
            ("facet_width", self.facet_width),
            ("facet_height", self.facet_height),
        ] {
            if value == 0 || value > MAX_FACET_PX {
                return Err(format!(
                    "plot.{} must be between 1 and {}, got {}",
                    name, MAX_FACET_PX, value
                ));
            }
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub languages: Option<Vec<String>>,
    pub programs: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub collisions: Option<Vec<String>>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub output: Option<PathBuf>,
}

impl Config {
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(v) = overrides.languages {
            self.languages = v;
        }
        if let Some(v) = overrides.programs {
            self.programs = v;
        }
        if let Some(v) = overrides.sizes {
            self.sizes = v;
        }
        if let Some(v) = overrides.collisions {
            self.collisions = v;
        }
        if let Some(v) = overrides.x {
            self.plot.x = v;
        }
        if let Some(v) = overrides.y {
            self.plot.y = v;
        }
        if let Some(v) = overrides.output {
            self.plot.output = v;
        }
    }
}

/// Parse TOML config text. `path` is only used for error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config> {
    let invalid = |detail: String| BenchplotError::ConfigParse {
        path: path.to_path_buf(),
        detail,
    };

    let config: Config = toml::from_str(text).map_err(|e| invalid(e.message().to_string()))?;
    config.plot.check_facet_size().map_err(invalid)?;
    Ok(config)
}

/// Find the config file to use, if any.
///
/// An explicit path always wins, even when it does not exist (reading it will
/// then fail loudly). Otherwise `benchplot.toml` in `cwd`, then
/// `{user_config_dir}/benchplot/config.toml`.
pub fn locate_config(
    explicit: Option<&Path>,
    cwd: &Path,
    user_config_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }

    let local = cwd.join(LOCAL_CONFIG);
    if local.is_file() {
        return Some(local);
    }

    let user = user_config_dir?.join("benchplot").join("config.toml");
    user.is_file().then_some(user)
}

/// Load the effective config: located file or built-in defaults.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<Config> {
    let user_dir = dirs::config_dir();
    let Some(path) = locate_config(explicit, cwd, user_dir.as_deref()) else {
        debug!("no config file found, using built-in defaults");
        return Ok(Config::default());
    };

    debug!(path = %path.display(), "reading config");
    let text = std::fs::read_to_string(&path).map_err(|source| BenchplotError::ConfigRead {
        path: path.clone(),
        source,
    })?;
    parse_config(&text, &path)
}
