pub mod catalog;
pub mod config;
pub mod images;
pub mod logging;
pub mod routes;
pub mod session;
pub mod store;
pub mod test_util;
pub mod transport;

pub use catalog::{CatalogError, QuizBank, RewardCatalog};
pub use self::config::Config;
pub use images::{ImageClient, ImageError};
pub use session::{EventKind, InboundEvent, SessionHandler, UserIdentity};
pub use store::{CounterField, SqliteUserStore, StoreError, UserRecord, UserStore};
pub use transport::{ChatTransport, MenuButton, TelegramTransport, TransportError};
