//! Remote remark generation: the generator trait and its HTTP backends.

pub mod gemini;
pub mod generator;
pub mod http_client;
pub mod openai;

pub use generator::{
    build_generator, OfflineGenerator, RemarkAction, RemarkGenerator, RemarkPrompt,
};
