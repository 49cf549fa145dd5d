// Services module - Business logic

pub mod card_service;
pub mod device_classifier;
pub mod enrichment;
pub mod geo_resolver;
pub mod metrics_tier;
pub mod scan_recorder;
pub mod social_links;

pub use card_service::{CardService, CardView};
pub use scan_recorder::{ScanMode, ScanRecorder, Visitor};
