pub mod parameters;
pub mod records;
pub mod rhythm;
pub mod strands;
pub mod topology;
