//! OpenGL capability checks and process-wide context defaults.

pub mod defaults;
pub mod probe;

pub use defaults::RenderDefaults;
pub use probe::{probe, RenderCapability, SdlOffscreen};
