pub mod account;
pub mod business;
pub mod product;

pub use account::{Account, PublicAccount};
pub use business::{Business, BusinessPublicInfo};
pub use product::{DiscoveryProduct, Product, PublicProduct, Sale, SaleWithProduct};
