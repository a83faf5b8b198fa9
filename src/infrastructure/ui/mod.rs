pub mod terminal;

pub use terminal::{render_message, sanitize};
