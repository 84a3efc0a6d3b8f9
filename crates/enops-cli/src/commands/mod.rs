pub mod auth;
pub mod completions;
pub mod forecast;
pub mod scenarios;
