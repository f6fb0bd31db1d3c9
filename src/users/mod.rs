mod dto;
pub mod handlers;
mod memory;
mod repo;
mod repo_types;
pub mod services;
mod store;

pub use dto::{CreateUserRequest, UpdateUserRequest};
pub use memory::MemoryUserStore;
pub use repo::PgUserStore;
pub use repo_types::{NewUser, PublicUser, User, UserChanges};
pub use store::{StoreError, UserStore};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::users_routes()
}
