//! Commands Layer
//!
//! Handlers that bridge the UI to the board, stores and session.

mod board_cmd;
mod comment_cmd;
mod profile_cmd;

#[cfg(test)]
mod tests;

pub use board_cmd::*;
pub use comment_cmd::*;
pub use profile_cmd::*;
