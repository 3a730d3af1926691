pub mod media;
pub mod video;
