pub mod dataset;
pub mod numeric;
