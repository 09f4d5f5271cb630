// SecretMarks platform paths
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `~/.config/secretmarks` (or `$XDG_CONFIG_HOME/secretmarks`)
/// - **macOS**: `~/Library/Application Support/SecretMarks`
/// - **Windows**: `%APPDATA%/SecretMarks`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        PathBuf::from(".secretmarks")
    }
}

/// Returns the platform-specific data directory, where the vault file lives by default.
///
/// - **Linux**: `~/.local/share/secretmarks` (or `$XDG_DATA_HOME/secretmarks`)
/// - **macOS**: `~/Library/Application Support/SecretMarks`
/// - **Windows**: `%APPDATA%/SecretMarks`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        PathBuf::from(".secretmarks")
    }
}
