//! User API: typed CRUD over a `user` table, wrapped in response envelopes and served over HTTP.

pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod pagination;
pub mod repository;
pub mod response;
pub mod routes;
pub mod settings;
pub mod state;
pub mod store;

pub use error::{AppError, ConfigError, StorageError};
pub use migration::ensure_user_table;
pub use model::{NewUser, Role, Status, User, UserId, ValidationError};
pub use pagination::{Page, PageRequest};
pub use repository::{MemoryUserRepository, PgUserRepository, UserRepository, UserStats};
pub use response::{handle_or_raise, wrap, ApiResponse, BusinessError};
pub use routes::{app, common_routes, user_routes};
pub use settings::{Settings, StoreSettings};
pub use state::AppState;
pub use store::{ensure_database_exists, open_repository, BootstrapError};
