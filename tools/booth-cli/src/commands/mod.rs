pub mod check;
pub mod compose;
pub mod console;
pub mod gallery;
pub mod layout;
pub mod send;
pub mod session;
pub mod stickers;
