pub mod auth;
pub mod cart;
pub mod companies;
pub mod discounts;
pub mod orders;
pub mod products;
