//! Configuration parsing for targets files

pub mod targets;
