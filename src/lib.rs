pub mod app;

pub use app::models::{FileEntry, MatchDecision, MatchMode, RuntimeConfig, ScanStats};
pub use app::scanner::{ScanObserver, Scanner, Silent};
