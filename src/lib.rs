pub mod cache;
pub mod clock;
pub mod config;
pub mod location;
pub mod repository;
pub mod routes;
pub mod weather;

#[cfg(test)]
mod testing;
