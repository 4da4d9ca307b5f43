// Re-export model types and service functions
pub mod clock;
pub mod guard;
pub mod http;
pub mod model;
pub mod service;

pub use model::{CreateTimeRecordPayload, TimeRecord};
pub use service::*;
pub use http::*;
