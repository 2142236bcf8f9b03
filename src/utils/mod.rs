pub mod encoding;
pub mod multipart_utils;
