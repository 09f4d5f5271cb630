// SecretMarks platform paths for Linux
// Config: ~/.config/secretmarks
// Data:   ~/.local/share/secretmarks

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "secretmarks";

fn home() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/secretmarks` if set, otherwise `~/.config/secretmarks`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
        _ => home().join(".config").join(APP_DIR),
    }
}

/// Uses `$XDG_DATA_HOME/secretmarks` if set, otherwise `~/.local/share/secretmarks`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
        _ => home().join(".local").join("share").join(APP_DIR),
    }
}
