pub mod chat_llm;
pub mod extractor;

pub use chat_llm::OpenAiChatAdapter;
pub use extractor::DocumentTextExtractor;
