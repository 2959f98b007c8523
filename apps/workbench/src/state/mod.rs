//! # State Module
//!
//! Application state for the workbench.
//!
//! Nothing here is global: the binary (or a frontend shell) builds each
//! state once and passes references into the actions that need them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │    DbState       │  │  CatalogStore    │  │   ProductEditor      │  │
//! │  │                  │  │                  │  │   (one per form)     │  │
//! │  │  Database pool   │  │  RwLock<         │  │                      │  │
//! │  │  PhotoStorage    │  │   Collection<T>> │  │  form + BoM lines    │  │
//! │  │                  │  │  status          │  │  live CostBreakdown  │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: pool and Arc'd storage, cloneable                          │
//! │  • CatalogStore: one RwLock per collection                             │
//! │  • ProductEditor: owned by its form, no sharing                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod db;
mod product_editor;
mod store;

pub use db::DbState;
pub use product_editor::ProductEditor;
pub use store::{CatalogStore, Collection, ConnectionStatus, StoreSnapshot};
