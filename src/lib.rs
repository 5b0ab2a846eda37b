pub mod config;
pub mod cursor;
pub mod error;
pub mod events;
pub mod filter;
pub mod listing;
pub mod settings;
pub mod slideshow;
pub mod tasks {
    pub mod navigator;
}

pub use cursor::TreeCursor;
pub use filter::ExtensionFilter;
pub use listing::{DirectorySource, FsSource};
pub use slideshow::{Navigation, Slide, Slideshow};
