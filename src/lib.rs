pub mod cases;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod extract;
pub mod markov;
pub mod models;
pub mod monte_carlo;
pub mod output;
pub mod random;
pub mod scenario;
pub mod solver;
pub mod state;
pub mod store;
