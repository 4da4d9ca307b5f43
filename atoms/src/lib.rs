pub mod jobs;
pub mod machines;
pub mod media;
pub mod timesheet;
pub mod users;
