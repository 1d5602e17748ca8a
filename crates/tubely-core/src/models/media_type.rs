use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::AppError;

/// Top-level media category an upload endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Image,
    Video,
}

impl MediaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Image => "image",
            MediaCategory::Video => "video",
        }
    }
}

/// A declared content type reduced to `type/subtype`, parameters dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    top_level: String,
    subtype: String,
}

impl MediaType {
    /// Subtype, also used as the stored file extension.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn essence(&self) -> String {
        format!("{}/{}", self.top_level, self.subtype)
    }

    pub fn is(&self, category: MediaCategory) -> bool {
        self.top_level == category.as_str()
    }

    /// Fails with `UnsupportedMedia` unless the type belongs to `category`.
    pub fn require(&self, category: MediaCategory) -> Result<(), AppError> {
        if self.is(category) {
            Ok(())
        } else {
            Err(AppError::UnsupportedMedia(format!(
                "Unsupported media type {}, expected {}/*",
                self.essence(),
                category.as_str()
            )))
        }
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parsed: mime::Mime = raw
            .trim()
            .parse()
            .map_err(|e| AppError::InvalidInput(format!("Invalid content type {:?}: {}", raw, e)))?;

        let top_level = parsed.type_().as_str().to_lowercase();
        let subtype = parsed.subtype().as_str().to_lowercase();
        if top_level.is_empty() || subtype.is_empty() || top_level == "*" || subtype == "*" {
            return Err(AppError::InvalidInput(format!(
                "Invalid content type {:?}: expected type/subtype",
                raw
            )));
        }

        Ok(MediaType { top_level, subtype })
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.top_level, self.subtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_are_dropped() {
        let media: MediaType = "video/MP4; codecs=\"avc1.42E01E\"".parse().unwrap();
        assert_eq!(media.essence(), "video/mp4");
        assert_eq!(media.subtype(), "mp4");
        assert!(media.is(MediaCategory::Video));
    }

    #[test]
    fn test_category_check() {
        let pdf: MediaType = "application/pdf".parse().unwrap();
        let err = pdf.require(MediaCategory::Video).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMedia(_)));

        let png: MediaType = "image/png".parse().unwrap();
        assert!(png.require(MediaCategory::Image).is_ok());
        assert!(png.require(MediaCategory::Video).is_err());
    }

    #[test]
    fn test_unparseable_is_invalid_input() {
        for raw in ["", "video", "not a mime", "*/*"] {
            let err = raw.parse::<MediaType>().unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)), "{raw:?}");
        }
    }
}
