pub mod config;
pub mod logging;

pub mod control;
pub mod http;
pub mod job;
pub mod listing;
pub mod mux;
pub mod naming;
pub mod playlist;
pub mod resolver;
pub mod retry;
pub mod rolling;
pub mod scheduler;
