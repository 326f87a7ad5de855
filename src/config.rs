use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(author, version, about = "Altitude-time temperature viewer for MTP-5 logs")]
pub struct Cli {
    /// Window layout
    #[arg(short, long, value_enum)]
    pub layout: Option<Layout>,
    /// Data folder to open on start-up
    #[arg(short, long, value_name = "DIR")]
    pub folder: Option<PathBuf>,
    /// JSON settings file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// How controls and chart share the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Controls on the left, chart embedded on the right.
    #[default]
    Split,
    /// Controls in the main window, each chart in its own window.
    Separate,
}

// ---------------------------------------------------------------------------
// Settings file
// ---------------------------------------------------------------------------

/// Start-up settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub layout: Layout,
    pub folder: Option<PathBuf>,
    pub window_size: [f32; 2],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Split,
            folder: None,
            window_size: [1400.0, 850.0],
        }
    }
}

impl ViewerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Settings file (if any) overridden by command-line flags.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(layout) = cli.layout {
            config.layout = layout;
        }
        if let Some(folder) = &cli.folder {
            config.folder = Some(folder.clone());
        }
        Ok(config)
    }
}
