// Handler modules
pub mod bzero;
pub mod mask;
pub mod register;
pub mod reorient;
pub mod tbss;
pub mod tools;

// Re-export all handler functions
pub use bzero::handle_bzero;
pub use mask::handle_mask;
pub use register::handle_register;
pub use reorient::handle_reorient;
pub use tbss::handle_tbss;
pub use tools::handle_tools;
