mod config;
mod dnd;
mod document;
mod editor;
mod engine;
mod host;
mod ops;
mod record;
mod renderer;
mod scanner;
mod scheduler;
mod suggestion;
mod sync;
mod value;

pub use crate::config::*;
pub use crate::dnd::*;
pub use crate::document::*;
pub use crate::editor::*;
pub use crate::engine::*;
pub use crate::host::*;
pub use crate::ops::*;
pub use crate::record::*;
pub use crate::renderer::*;
pub use crate::scanner::*;
pub use crate::scheduler::*;
pub use crate::suggestion::*;
pub use crate::sync::*;
pub use crate::value::*;
