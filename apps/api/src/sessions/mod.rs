pub mod handlers;
pub mod locks;
