//! Concrete collaborators per build target. Both expose the same surface:
//! `init_logging`, `mount_storage`, `hardware` and `DATA_DIR`.

#[cfg(any(test, target_os = "espidf"))]
mod mount;

#[cfg(target_os = "espidf")]
mod esp;
#[cfg(target_os = "espidf")]
pub use esp::*;

#[cfg(not(target_os = "espidf"))]
mod sim;
#[cfg(not(target_os = "espidf"))]
pub use sim::*;
