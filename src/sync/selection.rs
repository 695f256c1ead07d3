//! Turning a menu choice into a work list.
//!
//! Menus always show "All of them" first, followed by the candidates in the
//! order given, so index 0 means everything and index `i` means candidate
//! `i - 1`.

use async_trait::async_trait;

use crate::error::Result;

/// Title of the first menu entry.
pub const ALL_CHOICE: &str = "All of them";

/// Presents a menu and returns the chosen index, or `None` if the user backed out.
///
/// Implementations that wait on a terminal must do so off the async runtime.
#[async_trait]
pub trait Selector: Send + Sync {
    async fn select(&self, message: &str, choices: &[String]) -> Result<Option<usize>>;
}

/// Menu entries for `items`: "All of them" followed by each item.
pub fn menu<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    std::iter::once(ALL_CHOICE.to_string())
        .chain(items.into_iter().map(|s| s.as_ref().to_string()))
        .collect()
}

/// Resolve a menu index against the candidates it was built from.
///
/// An index past the end resolves to nothing.
pub fn resolve<T>(candidates: Vec<T>, choice_index: usize) -> Vec<T> {
    if choice_index == 0 {
        return candidates;
    }
    candidates.into_iter().nth(choice_index - 1).into_iter().collect()
}

/// Always answers with the same index. Useful for scripted runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSelector(pub Option<usize>);

#[async_trait]
impl Selector for FixedSelector {
    async fn select(&self, _message: &str, _choices: &[String]) -> Result<Option<usize>> {
        Ok(self.0)
    }
}
