pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod errors;
pub mod events;
pub mod models;
pub mod storage;
pub mod ui;
pub mod view;

pub use api::{DirectoryApi, HttpDirectory, Reply};
pub use config::ClientConfig;
pub use controller::ActivityClient;
pub use errors::ClientError;
pub use events::{Dialogs, UiEvent};
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore};
