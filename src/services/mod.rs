pub mod cleanup;
pub mod decoder;
pub mod invoker;
pub mod staging;
pub mod summarize_service;
