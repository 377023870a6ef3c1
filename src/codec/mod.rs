pub mod archive;
pub mod channel;
