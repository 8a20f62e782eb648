pub mod config;
pub mod measure;

use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "netmeasure.toml";

/// The config path to load: the flag, else `netmeasure.toml` in `cwd`.
pub fn config_path(flag: Option<&Path>, cwd: &Path) -> PathBuf {
    flag.map_or_else(|| cwd.join(DEFAULT_CONFIG_FILE), Path::to_path_buf)
}
