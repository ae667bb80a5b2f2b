//! Domain layer for the directory strategy.

pub mod filter;
pub mod provider;
pub mod search;
pub mod users;

pub use provider::BindAuthenticationProvider;
pub use search::UserSearch;
pub use users::DirectoryUserService;
