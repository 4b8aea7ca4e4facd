pub mod clicks;
pub mod cloudinary;
pub mod health;
pub mod notifications;
pub mod posts;
pub mod products;
pub mod settings;
