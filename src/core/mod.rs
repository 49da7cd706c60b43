pub mod alerts;
pub mod detection;
pub mod execution;
pub mod statistics;
pub mod status;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod tests;
