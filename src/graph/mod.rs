//! Link graph: flattened relations derived from pin declarations.

pub mod dedup;
pub mod link;
pub mod relation;
