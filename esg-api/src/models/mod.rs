pub mod carbon_emission;
pub mod company;
pub mod datetime;
pub mod energy_consumption;
pub mod sustainability_report;
pub mod user;

// Re-export models for easier access
pub use carbon_emission::*;
pub use company::*;
pub use energy_consumption::*;
pub use sustainability_report::*;
pub use user::*;
