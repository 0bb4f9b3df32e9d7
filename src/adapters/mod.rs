// Adapters layer: concrete implementations of the domain ports (storage, http extraction, prompts).

pub mod http;
pub mod prompt;
pub mod storage;
