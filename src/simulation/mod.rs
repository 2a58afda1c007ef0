mod config;
mod encoder;
mod environment;
mod physics;
mod reward;
mod spawn;
mod state;
mod termination;
mod vector;

pub use config::*;
pub use encoder::*;
pub use environment::*;
pub use physics::*;
pub use reward::*;
pub use spawn::*;
pub use state::*;
pub use termination::*;
pub use vector::*;
