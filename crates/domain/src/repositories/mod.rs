//! Repository Abstractions - ports implemented by the storage layer

mod role_grant_source;

pub use role_grant_source::RoleGrantSource;
