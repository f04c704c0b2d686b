pub mod fs_paths;
pub mod models;
