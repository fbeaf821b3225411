pub mod input;
pub mod tasks;
