pub mod genre;
mod paging;

pub use paging::Paging;
