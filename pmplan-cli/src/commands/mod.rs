//! CLI command implementations

pub mod catalog;
pub mod export;
pub mod plan;
pub mod session;
pub mod team;

pub use catalog::{CatalogArgs, TemplatesArgs};
pub use export::{ExportArgs, ImportArgs};
pub use plan::{
    AddArgs, DetailsArgs, EditArgs, InitArgs, ManagerArgs, SectionAction, SectionArgs, ShowArgs,
};
pub use session::Session;
pub use team::TeamArgs;
