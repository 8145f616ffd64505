//! ACME client construction and the default HTTP-backed client.

pub mod acme;
pub mod factory;
