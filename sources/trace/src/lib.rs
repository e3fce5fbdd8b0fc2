pub mod drive;
pub mod error;
pub mod member;
pub mod model;
pub mod producer;
pub mod renderer;
pub mod text;

pub use drive::{drive, render, DriveOptions};
pub use error::RenderError;
pub use renderer::ClassRenderer;
