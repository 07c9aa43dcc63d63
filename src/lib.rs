pub mod calc_client;
pub mod calc_worker;
pub mod config;
pub mod result_view;
pub mod state;
pub mod submission;
pub mod teams;
pub mod validation;
