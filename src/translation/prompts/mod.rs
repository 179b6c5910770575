/*!
 * Prompt engineering for catalog translation.
 *
 * This module provides:
 * - The system prompt template with placeholder-preservation rules
 * - Few-shot examples per target language
 * - The JSON user prompt for one batch
 */

pub mod templates;

// Re-export main types
pub use templates::{
    FewShotExample, PromptTemplate, RequestItem, TranslationPromptBuilder, TranslationRequest,
    estimate_tokens, few_shot_examples,
};
