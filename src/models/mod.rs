mod cart;
mod content;
mod library;
mod offline;

pub use cart::{Cart, CartItem};
pub use content::{Content, ContentType, RecommendationSource, RecommendedContent};
pub use library::{
    Bookmark, GiftCard, LibraryEntry, Purchase, ReadingSettings, ReadingStatistic,
};
pub use offline::{DownloadStatus, OfflineBook};
