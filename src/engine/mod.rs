//! Invocation surface: argument parsing, request building, replies

pub mod arg_parser;
pub mod cli;
pub mod handlers;
pub mod progress;
pub mod replies;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands, RunArgs, TypeArg};
pub use cli::handle_run;
pub use handlers::{request_from_args, request_from_config};
pub use replies::{list_chunks, progress_reply, summary_reply};
