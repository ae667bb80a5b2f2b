pub mod provider;
pub mod users;

pub use provider::StoreAuthenticationProvider;
pub use users::StoreUserService;
