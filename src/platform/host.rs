use std::fmt;

/// Raw OS and architecture identifiers reported by a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDescriptor {
    pub os: String,
    pub arch: String,
}

impl HostDescriptor {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Describe the host this process was compiled for.
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Whether the host belongs to the Windows family.
    pub fn is_windows(&self) -> bool {
        matches!(self.os.to_ascii_lowercase().as_str(), "windows" | "win32")
    }
}

impl fmt::Display for HostDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
