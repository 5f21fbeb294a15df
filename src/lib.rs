//! Users service: `GET /users` and `POST /users` over a single `users` table.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

pub use config::{ServiceConfig, StoreConfig};
pub use error::{AppError, ConfigError};
pub use model::{NewUser, User};
pub use routes::{app, common_routes, user_routes};
pub use state::AppState;
pub use store::{connect, Backend, UserStore};
