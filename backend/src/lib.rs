// --- File: backend/src/lib.rs ---

// The server is a library so integration tests can build the router
// and spawn it against their own database.
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod pages;
pub mod session;
pub mod web_server;
