#![allow(dead_code)]

pub mod executors;
pub mod fixtures;

pub use executors::*;
pub use fixtures::*;
