//! # t-editor — Viewer core for tilde
//!
//! The state the main loop drives and the renderer reads:
//!
//! - **[`document`]** — `Document` of byte `Row`s, append-only, loaded from any `BufRead`
//! - **[`cursor`]** — `Cursor` on the viewport, clamped on every movement
//! - **[`view`]** — `render` composes a full frame into a t-term `FrameBuffer`

pub mod cursor;
pub mod document;
pub mod view;
