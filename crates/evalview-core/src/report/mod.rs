pub mod console;

pub use console::{print_diff, render_diff};
