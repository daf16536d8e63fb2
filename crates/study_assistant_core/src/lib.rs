pub mod domain;
pub mod ports;
pub mod prompts;
pub mod quiz_parsing;

pub use domain::{
    QuestionKind, Quiz, QuizOutcome, QuizQuestion, SourceText, MAX_SOURCE_CHARS,
};
pub use ports::{LanguageModelService, PortError, PortResult, TextExtractionService};
pub use quiz_parsing::{parse_quiz_response, quiz_payload, strip_code_fences};
