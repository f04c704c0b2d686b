pub use safarivideos_core::models::{course, settings, task};
