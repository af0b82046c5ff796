//! Data models
//!
//! Entities persisted by the fair service (Exhibitor, Event, Notification,
//! CarouselSlide), the client-side Favorite record, and the typed admin
//! inputs that are validated before anything reaches the database.

mod carousel;
mod event;
mod exhibitor;
mod favorite;
mod notification;

pub use carousel::{CarouselSlide, CreateSlideInput, ReorderSlidesInput, UpdateSlideInput};
pub use event::{hhmm, Event, EventInput, ValidEvent};
pub use exhibitor::{synthetic_stand_size, Exhibitor, ExhibitorInput, MapPosition};
pub use favorite::{Favorite, FavoriteKind};
pub use notification::{Notification, NotificationInput, NotificationType};
