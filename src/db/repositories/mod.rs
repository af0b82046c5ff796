//! Database repositories
//!
//! One repository per entity, each a trait plus an sqlx implementation that
//! dispatches on the configured driver.

pub mod carousel;
pub mod event;
pub mod exhibitor;
pub mod notification;
pub mod settings;

pub use carousel::{CarouselRepository, ReorderOutcome, SqlxCarouselRepository};
pub use event::{EventRepository, SqlxEventRepository};
pub use exhibitor::{ExhibitorRepository, SqlxExhibitorRepository};
pub use notification::{NotificationRepository, SqlxNotificationRepository};
pub use settings::{SettingsRepository, SqlxSettingsRepository};
