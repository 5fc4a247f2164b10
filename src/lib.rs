pub mod app;
pub mod config;
pub mod conversation;
pub mod papers;
pub mod provider;
pub mod runtime;
pub mod shared;
pub mod tools;
