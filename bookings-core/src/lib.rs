pub mod forms;
pub mod models;
pub mod pii;
pub mod repository;
pub mod reservation;
pub mod session;

pub use forms::{validate, Form, FormErrors, Rule, ValidationResult};
pub use models::{Reservation, Room};
pub use repository::{InMemoryRoomRepository, RoomRepository};
pub use reservation::{read_pending, submit_reservation, SubmissionOutcome, RESERVATION_KEY};
pub use session::{MemorySessionStore, Session, SessionError, SessionStore};
