pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod mongo;
pub mod period;
pub mod report;
pub mod routes;
pub mod schemas;
pub mod statement;
pub mod store;
