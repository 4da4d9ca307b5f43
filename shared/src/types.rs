// Re-export the atom types routers and blocks pass around, so downstream
// crates can depend on jobtrack-shared alone.

pub use jobtrack_atoms::jobs::model::{
    AddImagesPayload, CloseJobPayload, CreateJobPayload, ImageList, Job,
};
pub use jobtrack_atoms::machines::model::MachineCostcenter;
pub use jobtrack_atoms::media::model::{JobImage, UploadImage};
pub use jobtrack_atoms::timesheet::model::{CreateTimeRecordPayload, TimeRecord};
pub use jobtrack_atoms::users::model::{AllowedUser, WageRates};
