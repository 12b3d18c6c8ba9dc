pub mod commands;
pub mod controller;
pub mod events;
pub mod state;

pub use controller::SessionController;
pub use events::SessionEvent;
pub use state::{PhaseKind, SessionSnapshot, SessionState};
