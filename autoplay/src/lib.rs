pub mod analysis;
pub mod config;
pub mod console;
pub mod driver;
pub mod engine;
pub mod intf;
pub mod queue;
pub mod uci;

#[cfg(test)]
mod testing;
