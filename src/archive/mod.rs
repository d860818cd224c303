//! Local and mirrored storage of WTK archive files.

pub mod error;
pub mod loader;
pub mod site_locator;
