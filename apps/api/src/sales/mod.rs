// Sales assist: free-text inference, sales-script generation, pro job intel
// and text-to-speech. Every model call goes through llm_client::AiProvider.

pub mod handlers;
pub mod prompts;
pub mod script;
pub mod tier;
