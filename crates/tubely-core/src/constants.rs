//! Route and form constants shared by the API and its tests.

/// Prefix for all JSON API routes
pub const API_PREFIX: &str = "/api";

/// Path thumbnails are served from
pub const ASSETS_ROUTE: &str = "/assets";

/// Multipart field carrying a thumbnail image
pub const THUMBNAIL_FORM_FIELD: &str = "thumbnail";

/// Multipart field carrying a video file
pub const VIDEO_FORM_FIELD: &str = "video";

/// Issuer stamped on access tokens
pub const ACCESS_TOKEN_ISSUER: &str = "tubely-access";

/// Path objects of the local storage backend are served from
pub const LOCAL_MEDIA_ROUTE: &str = "/media";
