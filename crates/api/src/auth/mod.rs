//! Bearer-token handling for admin routes.

pub mod jwt;
