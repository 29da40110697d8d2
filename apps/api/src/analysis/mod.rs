// Compatibility analysis: prompt construction, response normalization and the
// orchestrator that drives a single job-description/CV comparison end to end.
// All model calls go through llm_client, never directly from here.

pub mod handlers;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod prompts;
