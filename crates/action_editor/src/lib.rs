mod input;
mod menu;
mod node;
mod view;

pub use crate::node::ActionDrag;
pub use crate::view::*;
