// Resume vs job-posting skill analysis.
// All LLM calls go through llm_client, no direct HTTP calls here.

pub mod analyzer;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod prompts;
