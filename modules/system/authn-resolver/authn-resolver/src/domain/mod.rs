//! Domain layer for the AuthN resolver.

pub mod selector;
pub mod service;

pub use selector::select;
pub use service::Service;
