/// One user-selected file, as received from the intake layer.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: Option<String>,
}

/// Problems with the file itself. Handled locally; the gateway is never
/// contacted for these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("No file uploaded.")]
    MissingFile,
    #[error("Please upload a valid image file of your report.")]
    NotAnImage { mime_type: String },
    #[error("Image too large (max {} MB).", .limit_bytes.div_ceil(1024 * 1024))]
    TooLarge { limit_bytes: usize },
}

impl Upload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Declared content type indicates an image (`image/*`, parameters ignored).
    pub fn is_image(&self) -> bool {
        self.essence().starts_with("image/")
    }

    /// MIME type without parameters, lowercased.
    pub fn essence(&self) -> String {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    pub fn check(&self, max_bytes: usize) -> Result<(), InputError> {
        if self.bytes.is_empty() {
            return Err(InputError::MissingFile);
        }
        if !self.is_image() {
            return Err(InputError::NotAnImage {
                mime_type: self.mime_type.clone(),
            });
        }
        if self.bytes.len() > max_bytes {
            return Err(InputError::TooLarge { limit_bytes: max_bytes });
        }
        Ok(())
    }
}
