//! Pipeline stages for converting one uploaded document.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the engine can be swapped without touching staging or accounting.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ stage ──▶ engine ──▶ measure ──▶ cleanup
//! (bytes)    (temp file) (text)    (MB, %)    (unlink)
//! ```
//!
//! 1. [`stage`]: write the upload to a uniquely named temp file that keeps
//!    the original extension, then release the write handle
//! 2. [`engine`]: hand the staged path to the external converter
//! 3. [`measure`]: compare the declared upload size with the text length
//! 4. cleanup: [`stage::StagedFile::cleanup`]; dropping the staged file
//!    on any earlier exit removes it as well

pub mod engine;
pub mod measure;
pub mod stage;
