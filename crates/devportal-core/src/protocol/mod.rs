//! Developer server protocol: route table and response interpretation.

pub mod envelope;
pub mod routes;
