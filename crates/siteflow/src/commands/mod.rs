pub mod bucket;
pub mod cdn;
pub mod deploy;
pub mod upload;
