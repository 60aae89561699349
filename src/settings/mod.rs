//! Settings - configuration types and layered loading

mod config;
mod loader;

#[cfg(test)]
mod tests;

pub use self::config::AppConfig;
pub use self::loader::load_config;
