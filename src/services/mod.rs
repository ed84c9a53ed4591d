pub mod tracker;

pub use tracker::{create_window_tracker, WindowRegistry};
