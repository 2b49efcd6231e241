use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Operating systems with a native loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    Windows,
    MacOS,
}

#[derive(Debug, Error)]
#[error("unknown platform `{0}` (expected linux, windows or macos)")]
pub struct UnknownPlatform(pub String);

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Linux, Platform::Windows, Platform::MacOS];

    pub fn name(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::MacOS => "macos",
        }
    }

    /// File name of the loader executable for this platform.
    pub fn loader_file_name(self) -> &'static str {
        match self {
            Platform::Linux => "wasm4-toywasm-linux.exe",
            Platform::Windows => "wasm4-toywasm-windows.exe",
            Platform::MacOS => "wasm4-toywasm-macos.exe",
        }
    }

    /// File name of a finished bundle. Only Windows gets an extension.
    pub fn executable_name(self) -> &'static str {
        match self {
            Platform::Windows => "wasm4-game.exe",
            Platform::Linux | Platform::MacOS => "wasm4-game",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}
