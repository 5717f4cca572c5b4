pub mod columns;
pub mod editing;
pub mod interaction;
pub mod io;
pub mod links;
pub mod render;
pub mod session;
pub mod sync;

// Re-export key types for easier usage
pub use columns::{BlockConfig, BlockInstance, Position, parse, serialize};
pub use editing::{BlockSite, Document, DocumentHost, EditSession, find_column_blocks};
pub use interaction::{InteractionEngine, Outcome};
pub use io::*;
pub use links::{LinkIndex, Navigator, NoteIndex};
pub use render::{BlockView, HtmlRenderer, MarkdownRenderer, RenderOptions, TextRenderer};
pub use session::BlockSession;
pub use sync::{SyncController, WriteResult};
