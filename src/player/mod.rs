pub mod commands;
pub mod engine;
pub mod facade;
pub mod poller;
pub mod thread;
