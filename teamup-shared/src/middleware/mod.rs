mod auth_extractor;
mod observability;

pub use observability::*;
