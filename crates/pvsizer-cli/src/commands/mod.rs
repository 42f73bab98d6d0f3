pub mod cable;
pub mod calculate;
pub mod config;
pub mod losses;
pub mod resume;
pub mod utils;
pub mod validate;
