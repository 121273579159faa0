use std::{
    io::Cursor,
    path::Path,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat};
use rocket::tokio::{fs, task};

use crate::error::ReportError;


/// URL prefix under which saved photos are served.
pub const IMAGE_PUBLIC_DIR: &'static str = "imagenes_reportes";


/// Decodes a base64 photo, optionally wrapped in a data URI.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, ReportError> {
    // Strip "data:image/png;base64," if present.
    let payload = match encoded.split_once(',') {
        Some((head, rest)) if head.starts_with("data:") => rest,
        _ => encoded,
    };

    let compact = payload.chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>();

    STANDARD.decode(compact.as_bytes())
        .map_err(|err| ReportError::Validation(err.to_string()))
}

/// Parses image bytes in any supported format and re-encodes them as JPEG.
pub fn reencode_jpeg(bytes: &[u8]) -> Result<Vec<u8>, ReportError> {
    let img = image::load_from_memory(bytes)
        .map_err(|err| ReportError::Validation(err.to_string()))?;

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut jpeg = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .map_err(|err| ReportError::Validation(err.to_string()))?;

    Ok(jpeg)
}

/// Saves a base64 photo as `<epoch_secs>.jpg` in `dir` and returns its
/// public path. An existing file with the same name is overwritten.
pub async fn save_photo(encoded: String, dir: &Path, epoch_secs: i64) -> Result<String, ReportError> {
    let jpeg = task::spawn_blocking(move || {
        decode_base64(&encoded).and_then(|bytes| reencode_jpeg(&bytes))
    })
    .await
    .map_err(|err| ReportError::Io(std::io::Error::new(std::io::ErrorKind::Other, err)))??;

    let filename = format!("{}.jpg", epoch_secs);
    fs::write(dir.join(&filename), &jpeg).await?;

    Ok(format!("{}/{}", IMAGE_PUBLIC_DIR, filename))
}
