pub mod lattice;
pub mod line;
pub mod primitive_parser;
pub mod token;
