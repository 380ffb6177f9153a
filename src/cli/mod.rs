pub mod estimate;
pub mod setup;
pub mod ui;
