pub mod event;
pub mod level;
pub mod lifecycle;
pub mod scores;
pub mod state;
pub mod step;
