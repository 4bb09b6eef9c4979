//! Model catalog: capability resolution, token limits, snapshot loading.

pub mod catalog;
pub mod resolver;
