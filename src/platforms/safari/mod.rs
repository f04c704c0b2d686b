pub mod api;
pub mod downloader;
pub mod parser;
pub mod planner;
