pub mod cli;
pub mod curves;
pub mod events;
pub mod game;
pub mod land;
pub mod report;
pub mod scenario;
pub mod strategies;
pub mod ui;
pub mod war;
