pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
pub mod websocket;
