//! Wire and domain model declarations.

pub mod assistant;
pub mod chat;
pub mod grading;
pub mod question;
pub mod session;
pub mod user;
