//! Orchestration: the page runtime, its schedulers, and the terminal
//! preview's state, events and input handling.

pub mod event;
pub mod handler;
pub mod intersection;
pub mod replay;
pub mod runtime;
pub mod sampler;
pub mod scheduler;
pub mod state;
