use std::path::Path;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::config::image::ImageConfig;
use crate::error::{ImageError, Result};
use crate::models::image;
use crate::models::prelude::*;
use crate::state::DbConn;

/// Public URL prefix that `/uploads` serves stored files under
pub const PUBLIC_PATH_PREFIX: &str = "/uploads/images";

/// A file received from a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ImageService {
    db: DbConn,
    config: ImageConfig,
}

impl ImageService {
    pub fn new(db: DbConn, config: ImageConfig) -> Self {
        Self { db, config }
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Validate, write to disk and record the upload
    pub async fn upload(&self, user_id: Uuid, file: UploadedFile) -> Result<image::Model> {
        let content_type = file
            .content_type
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .unwrap_or_default();
        self.validate(&content_type, file.bytes.len() as u64)?;

        let original_file_name = file
            .file_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        let stored_file_name = format!(
            "{}.{}",
            Uuid::new_v4(),
            extension_for(&original_file_name, &content_type)
        );

        tokio::fs::create_dir_all(&self.config.upload_dir).await?;
        let target = self.config.upload_dir.join(&stored_file_name);
        tokio::fs::write(&target, &file.bytes).await?;

        let saved = image::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            original_file_name: Set(original_file_name),
            stored_file_name: Set(stored_file_name.clone()),
            file_path: Set(format!("{}/{}", PUBLIC_PATH_PREFIX, stored_file_name)),
            file_size: Set(file.bytes.len() as i64),
            content_type: Set(content_type),
            created_at: Set(Utc::now()),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await;

        match saved {
            Ok(model) => {
                tracing::info!(
                    image_id = %model.id,
                    user_id = %user_id,
                    size = model.file_size,
                    "Stored uploaded image"
                );
                Ok(model)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&target).await {
                    tracing::warn!(path = %target.display(), error = %cleanup, "Failed to remove orphaned upload");
                }
                Err(e.into())
            }
        }
    }

    /// Public path of a live image
    pub async fn path_of(&self, image_id: Uuid) -> Result<Option<String>> {
        Ok(Image::find_by_id(image_id)
            .filter(image::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .map(|img| img.file_path))
    }

    /// Lookup that never fails the caller; errors are logged
    pub async fn path_of_lenient(&self, image_id: Option<Uuid>) -> Option<String> {
        let image_id = image_id?;
        match self.path_of(image_id).await {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(image_id = %image_id, error = %e, "Failed to resolve image path");
                None
            }
        }
    }

    fn validate(&self, content_type: &str, size: u64) -> Result<()> {
        if !self.config.allowed_types.iter().any(|t| t == content_type) {
            return Err(ImageError::UnsupportedFileType(content_type.to_string()).into());
        }
        if size > self.config.max_file_size {
            return Err(ImageError::FileSizeExceeded {
                size,
                max: self.config.max_file_size,
            }
            .into());
        }
        Ok(())
    }
}

/// Extension from the original name, else from the content type
fn extension_for(file_name: &str, content_type: &str) -> String {
    let from_name = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| {
        match content_type {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "bin",
        }
        .to_string()
    })
}
