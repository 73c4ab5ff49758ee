//! I/O operations: HTTP, waiting, and staged placement on disk.

mod fetcher;
mod http;
mod pause;
mod staging;

pub use fetcher::Fetcher;
pub use http::{BoxStream, HttpClient, Response};
pub use pause::{Pause, TokioPause};
pub use staging::{is_staging_name, staging_path};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
