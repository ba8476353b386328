//! Asynchronous face detection for live camera feeds.
//!
//! The scheduling core admits at most one detection task at a time:
//! frames arriving while a task is in flight are dropped, keeping
//! results close to real time instead of accumulating a stale backlog.

pub mod detection;
pub mod scheduling;
pub mod shared;
