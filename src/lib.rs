pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod logging;
pub mod server;
pub mod service;
pub mod storage;

pub use config::Config;
pub use entity::{Note, NoteInput};
pub use error::{Result, SharenoteError};
pub use service::NoteService;
pub use storage::{DocumentStore, MemoryStore, SqliteStore};
