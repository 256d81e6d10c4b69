/// Default database URL for local development
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./bookstore.db?mode=rwc";

pub mod books;
pub mod core;
pub mod roles;
pub mod schema;
pub mod types;
pub mod users;

pub use books::{Book, NewBook};
pub use roles::{Permission, Role};
pub use types::Database;
pub use users::{DuplicateUser, NewUser, User};

#[cfg(test)]
pub mod test_helpers;
