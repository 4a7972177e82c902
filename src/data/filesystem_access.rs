//! File/code adapted from https://github.com/jamjamjon/usls

use std::path::PathBuf;

const APP_DIR: &str = "vigil";

/// Well-known base directories, each with a `vigil` subdirectory.
#[derive(Debug, Clone, Copy)]
pub enum FsAccess {
    Home,
    Config,
    Current,
}

impl FsAccess {
    /// Base path for the directory type, optionally with the `vigil` subdirectory
    /// (`.vigil` under home).
    fn get_path(&self, raw: bool) -> anyhow::Result<PathBuf> {
        let base_path = match self {
            FsAccess::Home => dirs::home_dir(),
            FsAccess::Config => dirs::config_dir(),
            FsAccess::Current => std::env::current_dir().ok(),
        };

        let mut path = base_path.ok_or_else(|| {
            anyhow::anyhow!("Unsupported operating system. Supported OS: Linux, MacOS, Windows.")
        })?;

        if !raw {
            if let FsAccess::Home = self {
                path.push(format!(".{APP_DIR}"));
            } else {
                path.push(APP_DIR);
            }
        }
        Ok(path)
    }

    /// The `vigil` directory, without creating it.
    ///
    /// Examples: `~/.config/vigil`, `~/.vigil`.
    pub fn path(&self) -> anyhow::Result<PathBuf> {
        self.get_path(false)
    }

    pub fn raw_path(&self) -> anyhow::Result<PathBuf> {
        self.get_path(true)
    }
}
