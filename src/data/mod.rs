pub mod bar;
pub mod feed;
pub mod loader;

pub use bar::Bar;
pub use feed::{HistoryWindow, MarketData};
pub use loader::{filter_by_ticker, load_csv};
