//! Domain Layer - store scope and error taxonomy

pub mod errors;
pub mod scope;

pub use errors::StoreError;
pub use scope::StoreScope;
