pub mod window;

pub use window::{RootActivity, WindowEvent, WindowEventKind, WindowField, WindowId};
