//! Terminal commands and rendering

pub mod best;
pub mod paths;
pub mod setup;
pub mod ui;
