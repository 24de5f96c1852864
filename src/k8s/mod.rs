//! OpenShift cluster operations

pub mod connection;
pub mod oc;
