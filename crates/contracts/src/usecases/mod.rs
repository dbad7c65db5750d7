pub mod common;
pub mod u501_upload_markup;
pub mod u502_import_manifest;
