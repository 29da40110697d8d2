// Shared prompt fragments. Each service that needs model calls defines its own
// prompts.rs alongside it and pulls cross-cutting fragments from here.

/// The generateContent endpoints take no system role, so this is appended to
/// the user prompt instead.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
