//! Helper functions shared by the generators and renderers

mod html;
mod url;

pub use html::*;
pub use url::*;
