pub mod build;
pub mod check_stage;
pub mod comments;
pub mod dispatch;
pub mod export;
pub mod schema;
pub mod shared;
pub mod validate;
