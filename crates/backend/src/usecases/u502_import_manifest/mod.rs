pub mod executor;
pub mod sheet_reader;
