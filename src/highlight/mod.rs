pub mod types;
pub mod config;
pub mod tokenizer;
pub mod pattern;
pub mod matcher;
pub mod grouper;
pub mod change;
pub mod engine;

pub use types::*;
pub use config::*;
pub use tokenizer::*;
pub use pattern::*;
pub use matcher::*;
pub use grouper::*;
pub use change::*;
pub use engine::*;
