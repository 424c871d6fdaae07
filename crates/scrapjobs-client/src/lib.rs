#[cfg(feature = "browser")]
pub mod browser;
pub mod http;

#[cfg(feature = "browser")]
pub use browser::{BrowserEngine, BrowserPage, BrowserSession};
pub use http::{HttpEngine, HttpPage, HttpSession};
