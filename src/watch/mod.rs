// src/watch/mod.rs

//! File watching and change qualification.
//!
//! This module is responsible for:
//! - The watch-primitive seam ([`WatchPrimitive`], [`EventStream`]) and its
//!   `notify`-backed implementation ([`NotifyWatcher`]).
//! - Deciding which directories are watched ([`dirs`]).
//! - The per-event predicates: extension filter, transient temp-file
//!   markers, change fingerprints and the debounce gate.
//!
//! It does **not** build or run anything; the engine turns qualifying
//! events into rebuild cycles.

pub mod debounce;
pub mod dirs;
pub mod event;
pub mod filter;
pub mod fingerprint;
pub mod path_utils;
pub mod primitive;
pub mod watcher;

pub use debounce::{should_trigger, DebounceGate, DEFAULT_DEBOUNCE_WINDOW};
pub use dirs::{expand_dir, expand_roots, DirectoryRules};
pub use event::{ChangeEvent, Op};
pub use filter::{is_watched, ExtensionFilter, TransientMarkers, DEFAULT_EXTENSION};
pub use fingerprint::FingerprintCache;
pub use primitive::{subscribe_all, EventSender, EventStream, WatchMessage, WatchPrimitive};
pub use watcher::NotifyWatcher;
