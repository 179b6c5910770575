/*!
 * Gettext catalog support.
 *
 * - `model`: catalog, entries and entry keys
 * - `parser`: `.po` text to `Catalog`
 * - `writer`: `Catalog` back to `.po` text with untouched entries preserved
 */

pub mod model;
pub mod parser;
pub(crate) mod writer;

pub use model::{Catalog, CatalogEntry, EntryKey, CONTEXT_SEPARATOR};
pub use parser::CatalogParser;
