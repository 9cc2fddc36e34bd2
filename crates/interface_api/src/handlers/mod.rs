//! Request handlers

pub mod billables;
pub mod health;
