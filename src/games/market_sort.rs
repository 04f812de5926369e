//! Market-sort minigame: drag each produce item into the crate showing its icon

use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::sim::pick::pick_excluding;
use crate::sim::{Clock, InputSnapshot, Lifecycle, Minigame, MinigameDescriptor, MinigameEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSortConfig {
    /// Icon pool crates draw from
    pub icons: Vec<String>,
    pub bin_count: usize,
    pub items_to_sort: usize,
}

impl Default for MarketSortConfig {
    fn default() -> Self {
        Self {
            icons: ["tomato", "avocado", "corn", "onion", "pepper", "lettuce", "potato"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bin_count: 3,
            items_to_sort: 5,
        }
    }
}

impl MarketSortConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bin_count == 0 || self.items_to_sort == 0 {
            return Err(ConfigError::Invalid(
                "market sort needs at least one crate and one item".to_string(),
            ));
        }
        if self.bin_count > self.icons.len() {
            return Err(ConfigError::Invalid(format!(
                "market sort has {} crates but only {} icons",
                self.bin_count,
                self.icons.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketItem {
    pub icon: String,
    pub sorted: bool,
}

pub struct MarketSort {
    lifecycle: Lifecycle,
    config: MarketSortConfig,
    rng: Pcg32,
    bins: Vec<String>,
    items: Vec<MarketItem>,
}

impl MarketSort {
    pub fn new(descriptor: MinigameDescriptor, config: MarketSortConfig, seed: u64) -> Self {
        Self {
            lifecycle: Lifecycle::new(descriptor),
            config,
            rng: Pcg32::seed_from_u64(seed),
            bins: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Icon shown on each crate
    pub fn bins(&self) -> &[String] {
        &self.bins
    }

    pub fn items(&self) -> &[MarketItem] {
        &self.items
    }

    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|i| !i.sorted).count()
    }
}

impl Minigame for MarketSort {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn reset(&mut self, _clock: &Clock) {
        self.bins.clear();
        for _ in 0..self.config.bin_count {
            match pick_excluding(&mut self.rng, &self.config.icons, &self.bins) {
                Some(icon) => self.bins.push(icon),
                None => log::warn!("Market sort has no icons to assign"),
            }
        }

        self.items = (0..self.config.items_to_sort)
            .filter_map(|_| self.bins.choose(&mut self.rng).cloned())
            .map(|icon| MarketItem {
                icon,
                sorted: false,
            })
            .collect();
    }

    fn update(&mut self, _clock: &Clock, input: &InputSnapshot) {
        let Some(drop) = input.drop else {
            return;
        };
        let Some(item) = self.items.get_mut(drop.item) else {
            log::debug!("Dropped unknown item {}", drop.item);
            return;
        };
        if item.sorted {
            return;
        }

        match drop.bin {
            Some(bin) if self.bins.get(bin) == Some(&item.icon) => {
                item.sorted = true;
                self.lifecycle.emit(MinigameEvent::ItemSorted { item: drop.item, bin });
            }
            _ => {
                // Returns to where it was picked up
                self.lifecycle.emit(MinigameEvent::ItemRejected { item: drop.item });
            }
        }

        if self.remaining() == 0 {
            self.lifecycle.won();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::DropAction;

    fn market() -> MarketSort {
        MarketSort::new(
            MinigameDescriptor::new("Market", 15.0, "", false),
            MarketSortConfig::default(),
            77,
        )
    }

    fn drop_on(item: usize, bin: Option<usize>) -> InputSnapshot {
        InputSnapshot {
            drop: Some(DropAction { item, bin }),
            ..Default::default()
        }
    }

    fn bin_for(game: &MarketSort, item: usize) -> usize {
        let icon = &game.items()[item].icon;
        game.bins().iter().position(|b| b == icon).unwrap()
    }

    #[test]
    fn test_bins_have_distinct_icons() {
        let mut game = market();
        let clock = Clock::new();
        for _ in 0..20 {
            game.start_game(&clock);
            let bins = game.bins();
            assert_eq!(bins.len(), 3);
            for (i, a) in bins.iter().enumerate() {
                assert!(!bins[i + 1..].contains(a));
            }
            assert_eq!(game.items().len(), 5);
            assert!(game.items().iter().all(|item| bins.contains(&item.icon)));
        }
    }

    #[test]
    fn test_sorting_everything_wins() {
        let mut game = market();
        let mut clock = Clock::new();
        game.start_game(&clock);
        for item in 0..5 {
            clock.advance(0.1);
            let bin = bin_for(&game, item);
            game.tick(&clock, &drop_on(item, Some(bin)));
        }
        assert!(game.has_won());
    }

    #[test]
    fn test_wrong_bin_rejects() {
        let mut game = market();
        let mut clock = Clock::new();
        game.start_game(&clock);
        let wrong = (bin_for(&game, 0) + 1) % 3;
        clock.advance(0.1);
        game.tick(&clock, &drop_on(0, Some(wrong)));
        clock.advance(0.1);
        game.tick(&clock, &drop_on(0, None));
        assert_eq!(game.remaining(), 5);
        assert!(game.is_playing());
        let rejected = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, MinigameEvent::ItemRejected { item: 0 }))
            .count();
        assert_eq!(rejected, 2);
    }

    #[test]
    fn test_validate() {
        assert!(MarketSortConfig::default().validate().is_ok());
        let config = MarketSortConfig {
            icons: vec!["corn".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
