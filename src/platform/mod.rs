//! Platform resolution
//!
//! Maps a description of the host (OS family and CPU architecture) to the
//! [`PlatformTag`] used to pick a release asset. Resolution is a pure
//! function of the [`HostDescriptor`] it is given; only
//! [`HostDescriptor::current`] looks at the running process.

mod host;
mod tag;

pub use host::HostDescriptor;
pub use tag::{PlatformTag, resolve};
