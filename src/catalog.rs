//! Storefront catalog access: typed product records, the eligibility filter, pagination, and the
//! stock write-back call.

pub mod fetcher;
pub mod page;
pub mod product;

pub use fetcher::*;
pub use page::*;
pub use product::*;
