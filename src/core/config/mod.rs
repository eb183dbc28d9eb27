pub mod data;
pub mod defaults;
pub mod io;
pub mod keys;
pub mod printing;

#[cfg(test)]
pub mod tests;

pub use data::{Appearance, Config};
pub use io::ConfigError;
pub use keys::CONFIG_KEYS;
