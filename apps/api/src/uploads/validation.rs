use crate::errors::AppError;

/// Resume formats accepted by the profile editor: PDF and Word.
pub const RESUME_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

const MAX_FILENAME_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Resume,
    ProfileImage,
}

impl UploadKind {
    /// Multipart field carrying the file.
    pub fn field_name(self) -> &'static str {
        match self {
            UploadKind::Resume => "resume",
            UploadKind::ProfileImage => "image",
        }
    }

    pub fn key_prefix(self) -> &'static str {
        match self {
            UploadKind::Resume => "resumes",
            UploadKind::ProfileImage => "profile-images",
        }
    }

    fn fallback_name(self) -> &'static str {
        match self {
            UploadKind::Resume => "resume.pdf",
            UploadKind::ProfileImage => "image",
        }
    }

    pub fn accepts(self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match self {
            UploadKind::Resume => RESUME_CONTENT_TYPES.contains(&essence.as_str()),
            UploadKind::ProfileImage => {
                essence.starts_with("image/") && essence.len() > "image/".len()
            }
        }
    }

    fn rejection(self) -> &'static str {
        match self {
            UploadKind::Resume => "Please upload a PDF or Word document",
            UploadKind::ProfileImage => "Please upload an image file",
        }
    }
}

/// Checks a file before anything is written to blob storage. The declared
/// content type wins; without one the type is inferred from the extension.
/// Returns the content type to store the blob under.
pub fn validate_upload(
    kind: UploadKind,
    filename: &str,
    content_type: Option<&str>,
    size: usize,
    max_bytes: usize,
) -> Result<String, AppError> {
    let content_type = content_type
        .filter(|ct| !ct.trim().is_empty() && *ct != "application/octet-stream")
        .map(str::to_string)
        .or_else(|| infer_content_type(filename).map(str::to_string))
        .ok_or_else(|| AppError::UnsupportedMediaType(kind.rejection().to_string()))?;

    if !kind.accepts(&content_type) {
        return Err(AppError::UnsupportedMediaType(kind.rejection().to_string()));
    }
    if size == 0 {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if size > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File size must be less than {}",
            format_limit(max_bytes)
        )));
    }
    Ok(content_type)
}

/// Whole megabytes or kilobytes when the limit is an exact multiple, bytes
/// otherwise.
fn format_limit(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}KB", bytes / KB)
    } else {
        format!("{bytes} bytes")
    }
}

pub fn infer_content_type(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    Some(match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => return None,
    })
}

/// Reduces a client-supplied filename to a safe basename for object keys.
pub fn sanitize_filename(kind: UploadKind, raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    let trimmed = out.trim_matches(|c| c == '-' || c == '.');
    if trimmed.is_empty() {
        return kind.fallback_name().to_string();
    }
    // Keep the extension when truncating.
    if trimmed.len() > MAX_FILENAME_LEN {
        return match trimmed.rsplit_once('.') {
            Some((stem, ext)) if ext.len() < 10 => {
                let keep = MAX_FILENAME_LEN - ext.len() - 1;
                format!("{}.{}", &stem[..keep.min(stem.len())], ext)
            }
            _ => trimmed[..MAX_FILENAME_LEN].to_string(),
        };
    }
    trimmed.to_string()
}

/// Object key: `<prefix>/<userId>-<millis>-<filename>`.
pub fn blob_key(kind: UploadKind, user_id: &str, millis: i64, filename: &str) -> String {
    let owner = sanitize_filename(kind, user_id);
    format!(
        "{}/{}-{}-{}",
        kind.key_prefix(),
        owner,
        millis,
        sanitize_filename(kind, filename)
    )
}
