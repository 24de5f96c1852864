//! Installation steps for cluster preparation

pub mod catalog;
pub mod dsc;
pub mod operators;
