//! litefs: a synchronous file-access layer for scripting hosts
//!
//! Files are addressed by integer descriptors and their contents cross the
//! host boundary hex-encoded. Path-level helpers cover the rest of the
//! filesystem surface a host needs.

/// Descriptor-based open/seek/read/write
pub mod access;

/// Line-delimited JSON host bridge
pub mod bridge;

/// Hex transport encoding
pub mod codec;

/// Command-line surface of the binary
pub mod cli;

/// JSON runtime configuration
pub mod config;

/// Persisted per-installation identifier
pub mod device_id;

/// Error type and host-facing error kinds
pub mod error;

/// Descriptor table
pub mod handle;

/// Startup constants exposed to the host
pub mod host;

/// Log subscriber setup
pub mod logging;

/// Path-level filesystem operations
pub mod path_ops;

pub use access::FileAccess;
pub use bridge::{Bridge, Request, Response};
pub use config::Config;
pub use error::{ErrorKind, FsError, FsResult};
pub use handle::Descriptor;
pub use host::HostConstants;
