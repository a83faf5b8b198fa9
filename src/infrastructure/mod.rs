pub mod audio;
pub mod config;
pub mod external;
pub mod ui;
