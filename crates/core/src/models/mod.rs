pub mod basket;
pub mod catalog;
pub mod order;
pub mod settings;
pub mod user;
pub mod view;
