//! Route handlers.

pub mod shell;
pub mod table;
