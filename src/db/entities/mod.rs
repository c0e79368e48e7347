//! Database entities

pub mod action;
pub mod image;
pub mod image_like;
pub mod user;

pub use image::Entity as Image;
pub use user::Entity as User;
