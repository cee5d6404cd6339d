pub mod handlers;
pub mod reconciler;
pub mod sections;
