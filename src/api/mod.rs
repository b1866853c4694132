//! Lambda handlers and request processing

pub mod helpers;
pub mod parsing;
pub mod quiz_handler;
pub mod token_handler;

pub use quiz_handler::QuizHandler;
pub use token_handler::TokenHandler;
