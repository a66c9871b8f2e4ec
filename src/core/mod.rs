pub mod archive;
pub mod cache;
pub mod config;
pub mod fetch;
pub mod install;
pub mod platform;

#[cfg(test)]
pub(crate) mod testing;
