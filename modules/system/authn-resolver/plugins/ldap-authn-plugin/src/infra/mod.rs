pub mod ldap;
pub mod memory;

pub use ldap::LdapDirectory;
pub use memory::InMemoryDirectory;
