pub mod analytics;
pub mod notifier;
pub mod quota;
pub mod signer;
pub mod usage;
pub mod worker;
