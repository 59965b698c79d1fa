#![allow(proc_macro_derive_resolution_fallback, unused_attributes)]

use tokio::{sync::mpsc::Sender, task::JoinHandle};

pub use async_trait::async_trait;
pub use thiserror::{self, *};
pub use tracing;

pub mod detector_params;
pub mod messages;
pub mod platform;
pub mod similarity;
pub mod types;

pub struct ActorWrapper<T> {
    pub join_handle: JoinHandle<()>,
    pub tx: Sender<T>,
}

#[macro_export]
macro_rules! tracing_debug {
    ($($arg:tt)+) => {
        $crate::tracing::debug!($($arg)+)
    };
}

#[macro_export]
macro_rules! tracing_info {
    ($($arg:tt)+) => {
        $crate::tracing::info!($($arg)+)
    };
}

#[macro_export]
macro_rules! tracing_warn {
    ($($arg:tt)+) => {
        $crate::tracing::warn!($($arg)+)
    };
}

#[macro_export]
macro_rules! tracing_error {
    ($($arg:tt)+) => {
        $crate::tracing::error!($($arg)+)
    };
}
