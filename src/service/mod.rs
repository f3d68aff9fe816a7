//! Domain logic kept free of HTTP concerns.

pub mod avatar;
pub mod decisions;
pub mod disputes;
pub mod mece;
pub mod mutual;
