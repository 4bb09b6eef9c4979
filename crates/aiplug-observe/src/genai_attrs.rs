//! OpenTelemetry GenAI Semantic Convention attribute names and values.
//!
//! Provider spans use the dotted names directly as `tracing` field names
//! (`gen_ai.request.model = ...`); the constants below document them and
//! supply the operation/provider values.

/// The name of the operation being performed (e.g., "chat").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g., "openai").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

/// The model ID requested.
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

// --- Operation name values ---

/// Chat completion.
pub const OP_CHAT: &str = "chat";

/// Legacy single-prompt text completion.
pub const OP_TEXT_COMPLETION: &str = "text_completion";

/// Embedding generation.
pub const OP_EMBEDDINGS: &str = "embeddings";

// --- Provider name values ---

pub const PROVIDER_OPENAI: &str = "openai";
