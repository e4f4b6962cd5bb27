//! Data models shared by the editor and its host.

pub mod block;
pub mod marker;
pub mod patch;
pub mod path;
pub mod presence;
pub mod selection;
