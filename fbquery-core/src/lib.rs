pub mod config;
pub mod data;
pub mod err;
pub mod qtree;
pub mod version;
