use std::path::PathBuf;

/// Immutable application configuration, built once at startup and passed
/// explicitly into every component.
pub struct OrbConfig {
    pub base_dir: PathBuf,
    pub db_path: PathBuf,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub max_dimension: u32,
    pub allowed_extensions: &'static [&'static str],
}

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_DIMENSION: u32 = 800;
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

impl Default for OrbConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbConfig {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .expect("Could not determine home directory")
            .join(".orb");
        Self::from_base(base)
    }

    pub fn from_base(base: PathBuf) -> Self {
        Self {
            db_path: base.join("orb.db"),
            uploads_dir: base.join("uploads"),
            base_dir: base,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            max_dimension: MAX_DIMENSION,
            allowed_extensions: ALLOWED_EXTENSIONS,
        }
    }
}
