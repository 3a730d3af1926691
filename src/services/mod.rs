pub mod aspect;
pub mod command;
pub mod ingest;
pub mod keys;
pub mod probe;
pub mod s3;
pub mod staging;
pub mod transcoder;
pub mod video_store;
