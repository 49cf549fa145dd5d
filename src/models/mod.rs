// Models module - Database entity representations

pub mod card;
pub mod scan;
pub mod subscription;

pub use card::{Card, NewCard};
pub use scan::{NewScan, Scan};
pub use subscription::Subscription;
