use std::env;
use std::path::PathBuf;

use super::{env_parse, parse_list};

pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const DEFAULT_ALLOWED_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp";

#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub upload_dir: PathBuf,
    pub max_file_size: u64,
    pub allowed_types: Vec<String>,
}

impl ImageConfig {
    pub fn from_env() -> Self {
        let allowed = env::var("AIMINDER_IMAGE_ALLOWED_TYPES")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_TYPES.to_string());

        Self {
            upload_dir: env::var("AIMINDER_IMAGE_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads/images")),
            max_file_size: env_parse("AIMINDER_IMAGE_MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE),
            allowed_types: parse_list(&allowed)
                .into_iter()
                .map(|t| t.to_lowercase())
                .collect(),
        }
    }
}
