pub mod channels;
pub mod check;
pub mod compose;
pub mod export;
pub mod import;
pub mod list;
pub mod refs;
pub mod resolve;
