pub mod clients;
pub mod config;
pub mod consumer;
pub mod logger;
pub mod models;
pub mod producer;
pub mod store;
pub mod web;
