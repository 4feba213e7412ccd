pub mod agent;
pub mod invocation;
pub mod resources;
