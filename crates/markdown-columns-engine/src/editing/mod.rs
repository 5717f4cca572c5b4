/*!
 * # Editing Module
 *
 * Everything that touches the host document's text.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - The whole document lives in one **`xi_rope::Rope`** buffer (`Document`)
 * - Edits are **Commands** (`Cmd`) compiled to xi-rope **Deltas**
 * - Saving writes the rope bytes verbatim: text outside an edited block is
 *   never regenerated
 *
 * ### 2. Block Discovery with Tree-sitter
 * - **Tree-sitter Markdown** finds fenced code blocks tagged `columns`
 * - Each hit is a `BlockSite`: wrapped span, content span and exact text
 *
 * ### 3. Host Abstraction
 * - `DocumentHost` is the narrow capability the sync controller needs: full
 *   text, replace one range, cursor position
 * - `Document` implements it; embedders can implement it over their own
 *   editor buffer
 *
 * ### 4. Column Editing Surface
 * - `EditSession` is a transient raw-text editor for one column with
 *   wikilink completion; it produces text, it never writes to the document
 *
 * ## Module Structure
 *
 * - **`document`**: `Document` (rope buffer, cursor, version)
 * - **`commands`**: `Cmd` enum and delta compilation
 * - **`patch`**: edit result metadata
 * - **`blocks`**: column block discovery and fence wrapping
 * - **`host`**: `DocumentHost` trait
 * - **`surface`**: `EditSession`
 */

pub mod blocks;
pub mod commands;
pub mod document;
pub mod host;
pub mod patch;
pub mod surface;

pub use blocks::{BLOCK_LANGUAGE, BlockSite, find_column_blocks};
pub use commands::Cmd;
pub use document::Document;
pub use host::DocumentHost;
pub use patch::Patch;
pub use surface::{CompletionQuery, EditSession};
