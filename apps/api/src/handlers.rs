pub mod evaluations;
pub mod health;
pub mod scoring_models;
pub mod submissions;
pub mod teams;
pub mod ws;
