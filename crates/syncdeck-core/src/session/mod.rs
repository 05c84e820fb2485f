pub mod controller;
pub mod event;

pub use controller::{PreviousSnapshot, Session, SessionController};
pub use event::{LoadTicket, LoadTicketId, SessionEvent, SessionState, Transition};
