use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::imageops::FilterType;

use super::model::{JobImage, UploadImage};

/// Largest image payload the job row will accept. Anything bigger is dropped
/// on the write path rather than failing the whole request (storage row size
/// compatibility; the original client behaved the same way).
pub const MAX_IMAGE_DATA_LEN: usize = 300_000;

/// Longest edge kept after recompression.
pub const MAX_IMAGE_WIDTH: u32 = 800;

/// JPEG quality used for recompressed uploads.
pub const JPEG_QUALITY: u8 = 60;

/// Turn raw uploads into storable images: recompress each file
/// independently, fall back to the untouched payload when compression
/// fails, then drop anything still over the size cap.
///
/// Files are processed as independent blocking tasks with no ordering
/// guarantee between them; one bad file never aborts the batch. The output
/// preserves the caller's list order.
pub async fn prepare_images(uploads: Vec<UploadImage>) -> Vec<JobImage> {
    let mut handles = Vec::with_capacity(uploads.len());
    for upload in uploads {
        handles.push((
            upload.clone(),
            tokio::task::spawn_blocking(move || compress_data_url(&upload.data)),
        ));
    }

    let mut images = Vec::with_capacity(handles.len());
    for (upload, handle) in handles {
        let data = match handle.await {
            Ok(data) => data,
            Err(e) => {
                // Task died; keep the uncompressed payload rather than lose the file.
                tracing::warn!("Image compression task failed, keeping original: {}", e);
                upload.data.clone()
            }
        };

        if data.len() >= MAX_IMAGE_DATA_LEN {
            tracing::warn!(
                "Dropping oversized image payload: name={:?} len={}",
                upload.name,
                data.len()
            );
            continue;
        }

        images.push(JobImage {
            id: upload
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: upload.name.unwrap_or_else(|| "image".to_string()),
            data,
        });
    }
    images
}

/// Recompress one data-URL payload: decode, scale down to MAX_IMAGE_WIDTH
/// if wider, re-encode as JPEG. Any failure returns the input unchanged.
pub fn compress_data_url(data: &str) -> String {
    match try_compress(data) {
        Some(compressed) => compressed,
        None => data.to_string(),
    }
}

fn try_compress(data: &str) -> Option<String> {
    let bytes = decode_data_url(data)?;
    let img = image::load_from_memory(&bytes).ok()?;

    let img = if img.width() > MAX_IMAGE_WIDTH {
        let height = (u64::from(img.height()) * u64::from(MAX_IMAGE_WIDTH)
            / u64::from(img.width())) as u32;
        img.resize_exact(MAX_IMAGE_WIDTH, height.max(1), FilterType::Triangle)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.encode_image(&rgb).ok()?;

    Some(format!("data:image/jpeg;base64,{}", BASE64.encode(&out)))
}

/// Extract the payload bytes of a base64 data-URL. None for anything that
/// is not a well-formed "data:<mime>;base64,<payload>" string.
pub fn decode_data_url(data: &str) -> Option<Vec<u8>> {
    let rest = data.strip_prefix("data:")?;
    let (_mime, payload) = rest.split_once(";base64,")?;
    BASE64.decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageEncoder;

    fn png_data_url(width: u32, height: u32) -> String {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 40, 200]));
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(&img, width, height, image::ColorType::Rgb8)
            .unwrap();
        format!("data:image/png;base64,{}", BASE64.encode(&out))
    }

    #[test]
    fn decode_rejects_non_data_urls() {
        assert!(decode_data_url("https://example.com/a.png").is_none());
        assert!(decode_data_url("data:image/png,rawtext").is_none());
        assert!(decode_data_url("data:image/png;base64,!!!").is_none());
        assert!(decode_data_url("data:image/png;base64,AAAA").is_some());
    }

    #[test]
    fn compress_reencodes_as_jpeg() {
        let url = png_data_url(16, 16);
        let out = compress_data_url(&url);
        assert!(out.starts_with("data:image/jpeg;base64,"));
        let bytes = decode_data_url(&out).unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());
    }

    #[test]
    fn compress_scales_down_wide_images() {
        let url = png_data_url(MAX_IMAGE_WIDTH * 2, 100);
        let out = compress_data_url(&url);
        let bytes = decode_data_url(&out).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.width(), MAX_IMAGE_WIDTH);
        assert_eq!(img.height(), 50);
    }

    #[test]
    fn compress_falls_back_on_undecodable_input() {
        let not_an_image = format!("data:image/png;base64,{}", BASE64.encode(b"hello"));
        assert_eq!(compress_data_url(&not_an_image), not_an_image);
        assert_eq!(compress_data_url("plain text"), "plain text");
    }

    #[tokio::test]
    async fn prepare_keeps_small_and_drops_oversized() {
        let big = "x".repeat(MAX_IMAGE_DATA_LEN);
        let uploads = vec![
            UploadImage {
                id: Some("keep-me".to_string()),
                name: Some("small.png".to_string()),
                data: png_data_url(8, 8),
            },
            UploadImage {
                id: None,
                name: Some("huge.bin".to_string()),
                data: big,
            },
        ];

        let images = prepare_images(uploads).await;
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, "keep-me");
        assert_eq!(images[0].name, "small.png");
    }

    #[tokio::test]
    async fn prepare_assigns_ids_and_names_when_missing() {
        let uploads = vec![UploadImage {
            id: None,
            name: None,
            data: png_data_url(8, 8),
        }];
        let images = prepare_images(uploads).await;
        assert_eq!(images.len(), 1);
        assert!(!images[0].id.is_empty());
        assert_eq!(images[0].name, "image");
    }
}
