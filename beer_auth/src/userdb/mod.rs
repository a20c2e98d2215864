mod errors;
mod memory;
mod sqlite;
mod store;
mod types;

pub use errors::UserError;
pub use memory::InMemoryUserStore;
pub use sqlite::SqliteUserStore;
pub use store::UsersRepository;
pub use types::{Identity, User};
