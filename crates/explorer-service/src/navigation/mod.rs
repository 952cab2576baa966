//! Where the user is and what they have selected.

pub mod path;
pub mod selection;

pub use path::{FetchTicket, PathModel};
pub use selection::SelectionModel;
