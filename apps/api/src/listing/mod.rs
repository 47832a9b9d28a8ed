// Listing generation: form models, prompt building, variant generation,
// session history and text export.
// All LLM calls go through llm_client.

pub mod export;
pub mod generator;
pub mod handlers;
pub mod history;
pub mod models;
pub mod prompts;
