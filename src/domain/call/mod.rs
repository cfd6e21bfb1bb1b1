//! Call bounded context - manages the lifecycle of telephone calls

pub mod aggregate;
pub mod event;
pub mod repository;
pub mod value_object;

pub use aggregate::Call;
pub use event::CallEvent;
pub use repository::CallRepository;
pub use value_object::{CallStatus, CallType, StatusEvent};
