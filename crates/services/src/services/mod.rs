pub mod auth;
pub mod config;
pub mod gamification;
pub mod routines;
pub mod schedule;
