pub mod federated;
pub mod identity;
pub mod logout;
pub mod registrations;
pub mod users;

pub use federated::MirroringFederatedLogin;
pub use identity::OidcIdentityHolder;
pub use logout::ProviderLogoutHandler;
pub use registrations::Registrations;
pub use users::MirroredUserService;
