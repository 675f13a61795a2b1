//! API Routes
//!
//! Route handlers organized by resource.

pub mod antiblat;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod leaders;
pub mod points;
pub mod prices;
pub mod services;
pub mod supervisors;
pub mod tasks;
pub mod team;
pub mod warnings;
