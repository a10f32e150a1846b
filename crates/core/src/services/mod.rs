pub mod checkout_service;
pub mod pricing_service;
pub mod view_service;
