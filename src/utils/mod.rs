pub mod fs;
pub mod logging;
pub mod progress;
