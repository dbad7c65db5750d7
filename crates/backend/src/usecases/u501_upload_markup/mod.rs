pub mod executor;
pub mod markup_parser;
