pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod company_service;
pub mod discount_service;
pub mod impersonation_service;
pub mod order_service;
pub mod pricing_service;
pub mod product_service;
pub mod stage_service;
pub mod tenancy_service;
