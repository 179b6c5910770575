/*!
 * Validation of translated catalog entries.
 *
 * - `placeholders`: checks that printf directives, brace placeholders,
 *   HTML tags and URLs survive translation
 *
 * Validation never blocks writing a translation; a failed check is reported
 * as a warning by the pipeline.
 */

pub mod placeholders;

// Re-export main types
pub use placeholders::{PlaceholderReport, PlaceholderSet, PlaceholderValidator, strip_placeholders};
