pub mod attributes;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod filter;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod projection;
pub mod render;
pub mod select;
pub mod session;
pub mod source;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, MapConfig, RenderConfig, load_config, parse_config};
pub use filter::{FilterState, YearRange};
pub use ir::{Attribute, GeoPoint, Highlight, Institution, Researcher};
pub use layout::{LayoutResult, compute_layout};
pub use projection::{PlanarPoint, Projector, Viewport};
pub use select::select;
pub use session::{Session, derive_layout};
pub use source::{JsonFileSource, LoadedRecords, MemorySource, RecordDump, RecordSource, load_or_empty};
pub use theme::Theme;
