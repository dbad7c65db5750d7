pub mod db;
pub mod raw_storage;
