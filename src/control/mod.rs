pub mod command;
pub mod smoothing;
