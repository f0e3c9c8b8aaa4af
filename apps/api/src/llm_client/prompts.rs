// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Rule block that enforces JSON-only output. The chat API has no separate
/// system slot in our single-message call, so it is spliced into the prompt.
pub const JSON_ONLY_RULE: &str =
    "Return ONLY valid JSON. No explanations, markdown, or code fences.";
