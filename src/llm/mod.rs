#[cfg(feature = "ollama")]
pub mod client;
pub mod prompts;
pub mod types;

#[cfg(feature = "ollama")]
pub use client::*;
pub use prompts::*;
pub use types::*;
