//! Settings handling between ingress and the provider call.

pub mod merge;
