pub mod extract;
pub mod headers;

pub use extract::{extract, ExtractOptions, ExtractSummary};
pub use headers::{show_headers, HeaderFormat};
