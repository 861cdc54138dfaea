//! Team logo storage backends

mod filesystem;
mod in_memory;

pub use filesystem::FilesystemLogoStore;
pub use in_memory::InMemoryLogoStore;
