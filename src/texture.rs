use std::rc::Rc;

use crate::{foundation::core::Texture, lending::Lease};

pub mod managed;
pub mod pool;

/// A leased texture shared by every consumer of one filter output.
///
/// The texture goes back to its owner when the last clone is dropped.
pub type SharedTexture = Rc<Lease<Texture>>;
