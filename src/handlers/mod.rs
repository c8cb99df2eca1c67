pub mod admin;
pub mod calendar;
pub mod health;
pub mod public;
