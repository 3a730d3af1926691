use std::fmt;

/// Media types the upload endpoints accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Mp4,
    Jpeg,
    Png,
}

impl MediaType {
    /// Parses a declared `Content-Type`, ignoring parameters and case.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
        match essence.as_str() {
            "video/mp4" => Some(MediaType::Mp4),
            "image/jpeg" => Some(MediaType::Jpeg),
            "image/png" => Some(MediaType::Png),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Mp4 => "video/mp4",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Mp4 => ".mp4",
            MediaType::Jpeg => ".jpeg",
            MediaType::Png => ".png",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File extension for an arbitrary content type; unknown types get `.bin`.
pub fn extension_for(content_type: &str) -> &'static str {
    MediaType::from_content_type(content_type)
        .map(|media_type| media_type.extension())
        .unwrap_or(".bin")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Video,
    Thumbnail,
}

impl UploadKind {
    pub fn allowed(&self) -> &'static [MediaType] {
        match self {
            UploadKind::Video => &[MediaType::Mp4],
            UploadKind::Thumbnail => &[MediaType::Jpeg, MediaType::Png],
        }
    }

    /// Validates a declared content type against this kind's allow-list.
    pub fn accept(&self, content_type: &str) -> Option<MediaType> {
        MediaType::from_content_type(content_type).filter(|m| self.allowed().contains(m))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Landscape,
    Portrait,
    Other,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Landscape => "landscape",
            Classification::Portrait => "portrait",
            Classification::Other => "other",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parameters_and_case_are_ignored() {
        assert_eq!(MediaType::from_content_type("video/mp4"), Some(MediaType::Mp4));
        assert_eq!(
            MediaType::from_content_type("Video/MP4; codecs=\"avc1.42E01E\""),
            Some(MediaType::Mp4)
        );
        assert_eq!(MediaType::from_content_type(" image/png "), Some(MediaType::Png));
        assert_eq!(MediaType::from_content_type("video/avi"), None);
        assert_eq!(MediaType::from_content_type(""), None);
    }

    #[test]
    fn allow_lists_are_per_upload_kind() {
        assert_eq!(UploadKind::Video.accept("video/mp4"), Some(MediaType::Mp4));
        assert_eq!(UploadKind::Video.accept("image/png"), None);
        assert_eq!(UploadKind::Video.accept("video/avi"), None);
        assert_eq!(UploadKind::Thumbnail.accept("image/jpeg"), Some(MediaType::Jpeg));
        assert_eq!(UploadKind::Thumbnail.accept("image/png"), Some(MediaType::Png));
        assert_eq!(UploadKind::Thumbnail.accept("image/gif"), None);
        assert_eq!(UploadKind::Thumbnail.accept("video/mp4"), None);
    }

    #[test]
    fn extensions_follow_a_fixed_mapping() {
        assert_eq!(extension_for("video/mp4"), ".mp4");
        assert_eq!(extension_for("image/jpeg"), ".jpeg");
        assert_eq!(extension_for("image/png"), ".png");
        assert_eq!(extension_for("application/x-unknown"), ".bin");
        assert_eq!(extension_for("garbage"), ".bin");
    }
}
