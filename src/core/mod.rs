pub mod auth;
pub mod filename;
pub mod http_client;
pub mod process;
pub mod ytdlp;
