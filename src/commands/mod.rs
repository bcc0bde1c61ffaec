pub(crate) mod scan;
pub(crate) mod serve;
