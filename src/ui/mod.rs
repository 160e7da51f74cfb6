//! UI shell panels

mod panels;

pub use panels::*;
