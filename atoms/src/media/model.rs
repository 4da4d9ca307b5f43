use serde::{Deserialize, Serialize};

/// Photo attached to a job's open or close list. `data` is a self-contained
/// data-URL; nothing else references it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobImage {
    pub id: String,
    pub name: String,
    pub data: String,
}

/// Raw upload as the client sends it. Clients keep their own ids so later
/// delete-by-id calls match what they display; missing fields get defaults.
#[derive(Debug, Deserialize, Clone)]
pub struct UploadImage {
    pub id: Option<String>,
    pub name: Option<String>,
    pub data: String,
}
