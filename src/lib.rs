pub mod app;
pub mod channels;
pub mod clock;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod reminder;
pub mod repository;
pub mod rollover;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use repository::ActivityRepository;
pub use state::AppState;
pub use storage::{ActivityStore, JsonFileStore};
