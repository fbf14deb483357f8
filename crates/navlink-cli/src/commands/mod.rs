pub mod resolve;
pub mod routes;
pub mod serialize;
