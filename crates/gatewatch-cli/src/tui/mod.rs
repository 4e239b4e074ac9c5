pub mod app;
mod ui;
