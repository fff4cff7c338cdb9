//! Canned completion provider for development without an API key.

use async_trait::async_trait;
use rand::Rng;

use crate::provider::{CompletionProvider, ProviderError};

/// Deliberately awkward raw completions: leading spaces, newline runs,
/// prompt-independent text. They exercise the trim and normalize pipeline
/// the same way a real upstream does.
const CANNED_SUGGESTIONS: [&str; 7] = [
    "is a very nice person",
    "This is a very good opportunity",
    "some weird stuff",
    "\n\nTest suggestion comes here",
    "\nThis is a sample suggestion here",
    " this starts with a space",
    "this ends with an exclamation mark!",
];

pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(
        &self,
        _prompt: &str,
        _temperature: Option<f64>,
    ) -> Result<String, ProviderError> {
        let index = rand::thread_rng().gen_range(0..CANNED_SUGGESTIONS.len());
        Ok(CANNED_SUGGESTIONS[index].to_string())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
