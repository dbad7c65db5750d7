pub mod a001_bundle;
pub mod a002_member;
pub mod a003_line_assignment;
pub mod common;
