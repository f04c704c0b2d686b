pub mod course;
pub mod settings;
pub mod task;
