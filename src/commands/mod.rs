pub mod goma;
pub mod unpack;
