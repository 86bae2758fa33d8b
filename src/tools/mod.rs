pub mod registry;
pub mod toolsets;
pub mod params;
pub mod payload;
pub mod paging;
pub mod users;
pub mod pages;
pub mod databases;
pub mod blocks;
pub mod comments;
pub mod search;

pub use registry::*;
pub use toolsets::*;
