pub mod booking;
pub mod hotel;
pub mod profile;
pub mod review;
pub mod setting;
pub mod user;
pub mod webhook_event;
