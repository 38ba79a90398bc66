pub mod automation;
pub mod configs;
pub mod health;
pub mod uploads;
