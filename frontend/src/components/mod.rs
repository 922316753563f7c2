pub mod compose;
pub mod conversation;
pub mod history;
pub mod notice;
