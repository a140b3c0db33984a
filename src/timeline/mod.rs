pub(crate) mod assembler;
pub(crate) mod resample;
pub(crate) mod sanitize;
