pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod ingest;
pub mod model;
pub mod options;
pub mod output;
pub mod proximity;
pub mod render;
pub mod session;
pub mod tracks;
pub mod view;
