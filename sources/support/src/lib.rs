pub mod bytes_ext;
pub mod descriptor;
pub mod flags;
pub mod signature;
