//! Models, ports and the service implementing the homepage rules

pub mod model;
pub mod ports;
pub mod service;
