use std::fmt;

use log::debug;

use super::HostDescriptor;
use crate::error::BootstrapError;

/// Canonical `{os}-{arch}` identifier of a release asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformTag {
    LinuxX64,
    LinuxArm64,
    MacosX64,
    MacosArm64,
    WindowsX64,
    WindowsArm64,
}

impl PlatformTag {
    pub const ALL: [PlatformTag; 6] = [
        PlatformTag::LinuxX64,
        PlatformTag::LinuxArm64,
        PlatformTag::MacosX64,
        PlatformTag::MacosArm64,
        PlatformTag::WindowsX64,
        PlatformTag::WindowsArm64,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformTag::LinuxX64 => "linux-x64",
            PlatformTag::LinuxArm64 => "linux-arm64",
            PlatformTag::MacosX64 => "macos-x64",
            PlatformTag::MacosArm64 => "macos-arm64",
            PlatformTag::WindowsX64 => "windows-x64",
            PlatformTag::WindowsArm64 => "windows-arm64",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, PlatformTag::WindowsX64 | PlatformTag::WindowsArm64)
    }

    /// Executable suffix of assets built for this platform.
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() { ".exe" } else { "" }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum OsFamily {
    Windows,
    Macos,
    Linux,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Arch {
    X64,
    Arm64,
    Other,
}

fn os_family(os: &str) -> Option<OsFamily> {
    match os.to_ascii_lowercase().as_str() {
        "windows" | "win32" => Some(OsFamily::Windows),
        "macos" | "darwin" => Some(OsFamily::Macos),
        "linux" => Some(OsFamily::Linux),
        _ => None,
    }
}

fn arch(arch: &str) -> Arch {
    match arch.to_ascii_lowercase().as_str() {
        "x86_64" | "x64" | "amd64" => Arch::X64,
        "aarch64" | "arm64" => Arch::Arm64,
        _ => Arch::Other,
    }
}

/// Resolve the release platform for `host`.
///
/// Windows on anything but x86-64 maps to `windows-arm64` whether or not
/// such an asset is published; a missing asset shows up later as a failed
/// download.
pub fn resolve(host: &HostDescriptor) -> Result<PlatformTag, BootstrapError> {
    let unsupported = || BootstrapError::UnsupportedPlatform {
        os: host.os.clone(),
        arch: host.arch.clone(),
    };

    let family = os_family(&host.os).ok_or_else(unsupported)?;
    let tag = match (family, arch(&host.arch)) {
        (OsFamily::Windows, Arch::X64) => PlatformTag::WindowsX64,
        (OsFamily::Windows, _) => PlatformTag::WindowsArm64,
        (OsFamily::Macos, Arch::X64) => PlatformTag::MacosX64,
        (OsFamily::Macos, Arch::Arm64) => PlatformTag::MacosArm64,
        (OsFamily::Linux, Arch::X64) => PlatformTag::LinuxX64,
        (OsFamily::Linux, Arch::Arm64) => PlatformTag::LinuxArm64,
        (_, Arch::Other) => return Err(unsupported()),
    };

    debug!("Resolved host {} to platform {}", host, tag);
    Ok(tag)
}
