pub mod media_type;
pub mod video;

pub use media_type::{MediaCategory, MediaType};
pub use video::{StoredObjectRef, Video};
