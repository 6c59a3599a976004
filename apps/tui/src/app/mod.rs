// App module for the table browser
// Holds browser state and maps keys onto it

pub mod input;
pub mod state;

pub use input::handle_input;
pub use state::{App, Focus, PendingProbe};
