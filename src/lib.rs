pub mod brt;
pub mod error;
pub mod fetch;
pub mod ntd;
pub mod output;
pub mod paths;
pub mod process;
pub mod systems;
pub mod table;
