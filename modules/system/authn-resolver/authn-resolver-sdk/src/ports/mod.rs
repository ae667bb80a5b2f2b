//! Collaborators a strategy needs from the hosting process.

pub mod directory;
pub mod password;
pub mod user_store;

pub use directory::{DirectoryClient, DirectoryEntry, DirectoryError};
pub use password::{DelegatingPasswordEncoder, PasswordEncoder, PasswordScheme};
pub use user_store::{InMemoryUserStore, StoreError, StoredUser, UserStore};
