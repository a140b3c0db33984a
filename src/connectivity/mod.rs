pub(crate) mod analyzer;
pub(crate) mod cache;
pub(crate) mod spawn;
