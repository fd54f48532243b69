//! Integration tests for the data type layer.

mod cast_matrix_test;
mod clone_test;
mod common;
mod literal_roundtrip_test;
mod lreal_casts_test;
mod wire_test;
