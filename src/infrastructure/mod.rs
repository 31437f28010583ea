pub mod invoker;
pub mod staging;
