//! Theme content hook.
//!
//! The host does not generate themed item lists itself; it asks a
//! [`ThemeSource`]. Production wires this to a hosted text-generation
//! service; demos and tests use [`StaticThemeSource`].

use bingohall_game::Item;

use crate::{HostError, RoundConfig};

/// Produces the item pool for a themed round.
///
/// # Example
///
/// ```rust
/// use bingohall_host::{HostError, ThemeSource};
///
/// /// Yields the same list for every theme. Fine for development.
/// struct CannedSource(Vec<String>);
///
/// impl ThemeSource for CannedSource {
///     async fn generate(
///         &self,
///         _theme: &str,
///     ) -> Result<Vec<String>, HostError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait ThemeSource: Send + Sync + 'static {
    /// Returns an ordered list of short strings for the theme, or a
    /// failure the round start must surface.
    fn generate(
        &self,
        theme: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, HostError>> + Send;
}

/// A fixed item list, ignoring the theme text.
#[derive(Debug, Clone)]
pub struct StaticThemeSource {
    items: Vec<String>,
}

impl StaticThemeSource {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

impl ThemeSource for StaticThemeSource {
    async fn generate(
        &self,
        _theme: &str,
    ) -> Result<Vec<String>, HostError> {
        Ok(self.items.clone())
    }
}

/// Builds a themed [`RoundConfig`] by asking the source for content.
///
/// The pool-size minimum is enforced when the round is built, so a
/// source returning fewer than 24 usable items aborts the round start
/// and the caller can fall back to standard mode or re-prompt.
pub async fn themed_round(
    source: &impl ThemeSource,
    theme: &str,
    prize: &str,
) -> Result<RoundConfig, HostError> {
    let items = source.generate(theme).await?;
    let items: Vec<Item> = items.into_iter().map(Item::from).collect();
    Ok(RoundConfig::themed(theme, items).with_prize(prize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_themed_round_uses_source_items() {
        let source = StaticThemeSource::new(
            (0..30).map(|i| format!("item-{i}")),
        );
        let round = themed_round(&source, "snacks", "a hat")
            .await
            .unwrap();
        assert_eq!(round.items.len(), 30);
        assert_eq!(round.theme, "snacks");
        assert_eq!(round.prize, "a hat");
        assert!(round.build_state().is_ok());
    }

    #[tokio::test]
    async fn test_themed_round_small_source_fails_at_build() {
        let source =
            StaticThemeSource::new((0..10).map(|i| format!("item-{i}")));
        let round =
            themed_round(&source, "snacks", "").await.unwrap();
        assert!(round.build_state().is_err(), "round start must abort");
    }
}
