//! Notes: the single resource of the API.

pub mod model;
pub mod repository;
pub mod file_store;

pub use file_store::FileNoteRepository;
pub use model::{generate_id, now_timestamp, Note, NoteDraft, NotePatch};
pub use repository::NoteRepository;
