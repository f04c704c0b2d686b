pub mod safari;
