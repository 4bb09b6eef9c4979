//! Call dispatch: declarative descriptors, predict path selection, and the
//! executor that runs descriptors against a backend.

pub mod descriptor;
pub mod executor;
pub mod predict;
