use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Flag,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuntimeOverrides {
    pub config: Option<PathBuf>,
}

/// Rules come from a file only when one is named on the command line;
/// nothing is picked up from the working directory or the environment.
#[derive(Debug, Clone)]
pub struct ResolvedRuntime {
    pub config_path: Option<PathBuf>,
    pub config_source: ValueSource,
}

impl ResolvedRuntime {
    pub fn diagnostics(&self) -> String {
        match &self.config_path {
            Some(path) => format!(
                "config_path={} ({})\nconfig_exists={}",
                normalize_for_display(path),
                self.config_source.as_str(),
                if path.exists() { "yes" } else { "no" },
            ),
            None => format!(
                "config_path=<none> ({})\nrules=built-in",
                self.config_source.as_str()
            ),
        }
    }

    pub fn ensure_config_present(&self) -> Result<()> {
        if let Some(path) = &self.config_path
            && !path.exists()
        {
            bail!(
                "config file not found: {} (from {})",
                normalize_for_display(path),
                self.config_source.as_str()
            );
        }
        Ok(())
    }
}

pub fn resolve_runtime(overrides: &RuntimeOverrides) -> ResolvedRuntime {
    match overrides.config.as_deref() {
        Some(path) => ResolvedRuntime {
            config_path: Some(path.to_path_buf()),
            config_source: ValueSource::Flag,
        },
        None => ResolvedRuntime {
            config_path: None,
            config_source: ValueSource::Default,
        },
    }
}

fn normalize_for_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
