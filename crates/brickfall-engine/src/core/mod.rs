pub use self::{brick::*, cell::*};

pub(crate) mod brick;
pub(crate) mod cell;
