pub mod config;
pub mod consumer;
pub mod db;
pub mod feed;
pub mod ingest;
pub mod model;
pub mod params;
pub mod retention;
pub mod server;
pub mod store;
pub mod title;
