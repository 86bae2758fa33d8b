pub mod notion;
pub mod transport;

pub use notion::{NotionClient, Pagination};
pub use transport::{ApiRequest, HttpTransport, NotionTransport};
