//! Configuration for trustyai-setup

pub mod operators;
pub mod settings;

pub use operators::OperatorSpec;
pub use settings::Settings;
