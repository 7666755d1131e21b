pub mod audit;
pub mod config;
pub mod entropy;
pub mod error;
pub mod hasher;
pub mod metadata;
pub mod mover;
pub mod namer;
pub mod paths;
pub mod progress;
pub mod session;

pub use config::AppConfig;
pub use error::Error;
pub use mover::{FileSystem, RealFileSystem};
pub use progress::{ProgressReporter, SilentReporter};
pub use session::{ConfirmationProvider, Outcome, RunState, TrashEntry, TrashSession};
