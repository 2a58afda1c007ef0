mod error;
pub mod init;
mod runner;
mod simulation;

pub use error::*;
pub use runner::*;
pub use simulation::*;
