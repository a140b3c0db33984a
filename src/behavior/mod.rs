pub(crate) mod executor;
pub(crate) mod kind;
pub(crate) mod primitives;
pub(crate) mod segment;
