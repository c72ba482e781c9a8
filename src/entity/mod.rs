pub mod audit_logs;
pub mod cart_items;
pub mod companies;
pub mod order_item_discounts;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod sessions;
pub mod user_companies;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use companies::Entity as Companies;
pub use order_item_discounts::Entity as OrderItemDiscounts;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use sessions::Entity as Sessions;
pub use user_companies::Entity as UserCompanies;
pub use users::Entity as Users;
