pub mod client;
pub mod manager;
pub mod mock;
pub mod openai;
pub mod protocol;
pub mod provider;
pub mod server;

pub use client::SuggestionClient;
pub use manager::BackendManager;
pub use provider::{provider_from_config, CompletionProvider, ProviderError};
