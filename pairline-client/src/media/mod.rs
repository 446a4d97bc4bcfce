pub mod media_source;
pub mod synthetic_media;

pub use media_source::*;
pub use synthetic_media::*;
