#![forbid(unsafe_code)]

pub mod error;
pub mod fallback;
pub mod generate;
pub mod manager;

pub use vocab_core::Clock;

pub use error::{CreateSessionError, GenerationError, GenerationErrorKind};
pub use fallback::fallback_words;
pub use generate::{GeneratorConfig, HttpWordGenerator, RetryPolicy, WordGenerator};
pub use manager::{SessionManager, SessionManagerConfig};
