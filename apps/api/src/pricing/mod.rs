// Pricing engine: yard-condition heuristics, the price formula, and the
// two endpoints built on them (/price and /analyze-image).
// Vision calls go through llm_client; everything else here is pure.

pub mod estimate;
pub mod handlers;
pub mod heuristics;
pub mod prompts;
