//! Router contract consumed by the shell, with an in-memory history.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Overwrite the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl NavigateOptions {
    pub fn push() -> Self {
        Self { replace: false }
    }

    pub fn replace() -> Self {
        Self { replace: true }
    }
}

pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    fn navigate(&self, path: &str, options: NavigateOptions);
}

#[derive(Debug)]
struct History {
    entries: Vec<String>,
    cursor: usize,
}

/// Browser-like history stack.
///
/// Pushing truncates any forward entries; replacing overwrites the entry at
/// the cursor so the previous path is no longer reachable with `back()`.
#[derive(Debug)]
pub struct HistoryNavigator {
    history: Mutex<History>,
}

impl HistoryNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(History {
                entries: vec![initial_path.into()],
                cursor: 0,
            }),
        }
    }

    /// Step back one entry. Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        let mut history = self.lock();
        if history.cursor == 0 {
            return false;
        }
        history.cursor -= 1;
        true
    }

    pub fn entries(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> String {
        let history = self.lock();
        history.entries.get(history.cursor).cloned().unwrap_or_default()
    }

    fn navigate(&self, path: &str, options: NavigateOptions) {
        let mut history = self.lock();
        let cursor = history.cursor;

        if options.replace {
            if let Some(entry) = history.entries.get_mut(cursor) {
                *entry = path.to_string();
            }
        } else {
            history.entries.truncate(cursor + 1);
            history.entries.push(path.to_string());
            history.cursor = history.entries.len() - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_back_returns_previous_path() {
        let nav = HistoryNavigator::new("/customers");
        nav.navigate("/cfdi-list", NavigateOptions::push());

        assert!(nav.back());
        assert_eq!(nav.current_path(), "/customers");
    }

    #[test]
    fn replace_makes_previous_path_unreachable() {
        let nav = HistoryNavigator::new("/factura-normal");
        nav.navigate("/customers", NavigateOptions::push());
        nav.navigate("/factura-normal", NavigateOptions::replace());

        assert_eq!(nav.entries(), vec!["/factura-normal", "/factura-normal"]);
        assert!(nav.back());
        assert_eq!(nav.current_path(), "/factura-normal");
        assert!(!nav.back());
    }

    #[test]
    fn push_after_back_drops_forward_entries() {
        let nav = HistoryNavigator::new("/a");
        nav.navigate("/b", NavigateOptions::push());
        nav.back();
        nav.navigate("/c", NavigateOptions::push());

        assert_eq!(nav.entries(), vec!["/a", "/c"]);
    }
}
