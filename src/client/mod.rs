//! Implementations of the catalog service trait

pub mod http;
pub mod in_memory;

pub use http::HttpDogApi;
pub use in_memory::InMemoryDogApi;
