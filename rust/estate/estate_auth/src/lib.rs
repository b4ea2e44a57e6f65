pub mod constant;
pub mod credentials;
pub mod error;
pub mod headers;
pub mod middleware;
pub mod token;
