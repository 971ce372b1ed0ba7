pub mod handlers;
pub mod memory;
pub mod pagination;
pub mod postgres;
pub mod store;
pub mod validation;
