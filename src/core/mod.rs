// Core modules implementing the query model, key alphabet, paths, and error modeling.
pub mod error;
pub mod keys;
pub mod path;
pub mod query;
