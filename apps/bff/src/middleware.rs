//! # ミドルウェア
//!
//! BFF 用のミドルウェアを提供する。

mod cache_control;
mod method_guard;
pub mod request_id;

pub use cache_control::no_cache;
pub use method_guard::{MethodGuard, only, require_method};
