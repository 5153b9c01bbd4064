//! # Application State
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Arc<AppState>                                                          │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────────┐  ┌──────────────────────┐  │
//! │  │   Database   │  │     CartSessions     │  │ ServerConfig         │  │
//! │  │              │  │                      │  │ ReceiptRenderer      │  │
//! │  │  pool +      │  │  Mutex<HashMap<      │  │                      │  │
//! │  │  commit lock │  │    terminal, Cart>>  │  │  read-only           │  │
//! │  └──────────────┘  └──────────────────────┘  └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart arithmetic is synchronous, so carts sit behind a plain std mutex
//! that is never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use atelier_core::{Cart, ReceiptRenderer};
use atelier_db::Database;

use crate::config::ServerConfig;

pub type SharedState = Arc<AppState>;

#[derive(Debug)]
pub struct AppState {
    pub db: Database,
    pub carts: CartSessions,
    pub config: ServerConfig,
    pub renderer: ReceiptRenderer,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let renderer = ReceiptRenderer::new(
            config.store_header(),
            config.store.currency_symbol.clone(),
            config.store.receipt_width,
        );

        AppState {
            db,
            carts: CartSessions::default(),
            config,
            renderer,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }

    pub fn receipt_prefix(&self) -> &str {
        &self.config.store.receipt_prefix
    }
}

/// One cart per terminal id.
///
/// A cart is created on first touch and dropped again once it holds
/// nothing, so the map only tracks terminals mid-sale.
#[derive(Debug, Default)]
pub struct CartSessions {
    carts: Mutex<HashMap<String, Cart>>,
}

impl CartSessions {
    /// Runs `f` against the terminal's cart under the lock.
    pub fn with_cart<R>(&self, terminal: &str, f: impl FnOnce(&mut Cart) -> R) -> R {
        // a poisoned lock still guards a usable map
        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        let cart = carts.entry(terminal.to_string()).or_default();
        let result = f(cart);
        if cart.is_empty() && cart.discount.is_none() {
            carts.remove(terminal);
        }
        result
    }

    pub fn terminal_count(&self) -> usize {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
