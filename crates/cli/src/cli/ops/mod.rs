pub mod dump;
pub mod stress;
pub mod version;
pub mod watch;

pub use dump::Dump;
pub use stress::Stress;
pub use version::Version;
pub use watch::Watch;
