pub mod agents;
pub mod check;
pub mod config;
pub mod helpers;
pub mod invoke;
pub mod paging;
pub mod resources;
pub mod versions;
