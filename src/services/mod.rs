// Service exports
pub mod console;
pub mod hma;

pub use console::Console;
pub use hma::{HmaClient, HmaError};
