pub mod config;
pub mod limited_io;
pub mod list_file;
