//! Command implementations for the trustyai-setup CLI

pub mod setup;
