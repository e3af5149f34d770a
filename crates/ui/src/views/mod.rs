mod console;
mod state;

pub use console::{render_screen, render_summary};
pub use state::{ViewError, ViewState, view_state_from_load};
