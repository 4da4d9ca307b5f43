use serde::{Deserialize, Serialize};

use crate::media::model::{JobImage, UploadImage};

/// Job domain model - one tracked open/close work order against a machine.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Job {
    pub job_id: String,
    pub machine_name: String,
    pub job_name: String,
    pub status: String, // "open" | "closed"
    pub open_date: String,
    pub close_date: Option<String>,
    #[serde(default)]
    pub open_images: Vec<JobImage>,
    #[serde(default)]
    pub close_images: Vec<JobImage>,
    pub user_email: String,
    pub user_name: String,
    pub electrical_responsible: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobPayload {
    pub machine_name: String,
    pub job_name: Option<String>,
    pub open_date: Option<String>,
    #[serde(default)]
    pub open_images: Vec<UploadImage>,
    pub electrical_responsible: Option<String>,
}

/// Body of PATCH /jobs/{id}/close. Everything is optional so a quick close
/// (today, no photos) is an empty body.
#[derive(Debug, Default, Deserialize)]
pub struct CloseJobPayload {
    pub close_date: Option<String>,
    #[serde(default)]
    pub close_images: Vec<UploadImage>,
}

#[derive(Debug, Deserialize)]
pub struct AddImagesPayload {
    pub images: Vec<UploadImage>,
}

/// Which of a job's two image lists an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageList {
    Open,
    Close,
}

impl ImageList {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(ImageList::Open),
            "close" => Some(ImageList::Close),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            ImageList::Open => "open_images",
            ImageList::Close => "close_images",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_list_parsing() {
        assert_eq!(ImageList::parse("open"), Some(ImageList::Open));
        assert_eq!(ImageList::parse("close"), Some(ImageList::Close));
        assert_eq!(ImageList::parse("both"), None);
        assert_eq!(ImageList::Open.column(), "open_images");
        assert_eq!(ImageList::Close.column(), "close_images");
    }

    #[test]
    fn close_payload_defaults_to_empty() {
        let payload: CloseJobPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.close_date.is_none());
        assert!(payload.close_images.is_empty());
    }

    #[test]
    fn job_roundtrips_through_json() {
        let job = Job {
            job_id: "j1".to_string(),
            machine_name: "CNC-01".to_string(),
            job_name: "CNC-01".to_string(),
            status: "open".to_string(),
            open_date: "2024-05-01".to_string(),
            close_date: None,
            open_images: vec![],
            close_images: vec![],
            user_email: "op@example.com".to_string(),
            user_name: "Op".to_string(),
            electrical_responsible: Some("Somchai".to_string()),
            created_at: "2024-05-01T08:00:00Z".to_string(),
            updated_at: None,
        };
        let json = serde_json::to_string(&job).unwrap();
        let back: Job = serde_json::from_str(&json).unwrap();
        assert_eq!(back.machine_name, "CNC-01");
        assert_eq!(back.status, "open");
        assert!(back.close_date.is_none());
    }
}
