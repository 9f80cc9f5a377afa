//! Flutter bridge for the habit tracker core.

pub mod api;
