pub mod deck;
pub mod note;
pub mod user;
