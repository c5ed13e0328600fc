// server/src/lib.rs

pub mod cli;
pub mod logging;
