//! Identity provider adapters.

mod dto;
mod http_provider;
mod memory;

pub use http_provider::{HttpIdentityProvider, IdentityProviderConfig};
pub use memory::InMemoryIdentityProvider;
