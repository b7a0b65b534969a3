pub mod content;
pub mod notification;
