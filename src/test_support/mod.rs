//! Test-only helpers shared by unit tests across modules.

pub mod scripted;
pub mod socket_guard;
pub mod writer;
