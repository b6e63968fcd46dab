//! Route handlers: auth endpoints, the route guard, health, and the guarded pages.

pub mod auth;
pub mod health;
pub mod pages;
