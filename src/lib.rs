pub mod config;
pub mod context;
pub mod error;
pub mod prepare;
pub mod process;
pub mod ui;
pub mod verify;
pub mod version;

pub use config::{LockfileUpdate, PluginConfig};
pub use context::Context;
pub use error::{GemPrepareError, Result};
pub use prepare::{prepare, PrepareResult};
pub use version::NextRelease;
