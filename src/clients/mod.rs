//! External service clients.

pub mod openai;
pub mod safety_search;

pub use openai::OpenAIGenerationClient;
pub use safety_search::HttpSafetySearchClient;
