pub mod openai;

pub use openai::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatResponseMessage,
    ChatRole, ChatUsage, OpenaiErrorBody, OpenaiErrorObject,
};
