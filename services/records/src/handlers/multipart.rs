use axum::extract::Multipart;

use crate::error::RecordsServiceError;
use crate::usecase::upload::FileUpload;

/// Name of the multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Pull the `file` field out of a multipart body, skipping any other fields.
pub async fn read_file_field(mut multipart: Multipart) -> Result<FileUpload, RecordsServiceError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RecordsServiceError::InvalidUpload(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| RecordsServiceError::InvalidUpload(e.body_text()))?;
        return Ok(FileUpload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(RecordsServiceError::MissingData(FILE_FIELD))
}
