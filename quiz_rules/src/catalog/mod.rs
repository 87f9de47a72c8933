//! Scenario catalog - read-only lookup over the static story database,
//! plus the selection-screen metadata (purchasable languages, levels, and
//! the avatar roster).

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scenario::{AvatarId, LanguageId, LevelId, Scenario, ScenarioError};

/// A language on the selection screen, with its unlock price in gold.
/// Price 0 means free tier: every new account starts with it unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageOffer {
    pub id: LanguageId,
    pub price: u32,
}

/// A proficiency level on the selection screen, with its unlock price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelOffer {
    pub id: LevelId,
    pub name: String,
    pub price: u32,
}

/// A playable castle role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    pub id: AvatarId,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog contains no scenarios")]
    Empty,

    #[error("invalid scenario content: {0}")]
    Invalid(#[from] ScenarioError),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The full static content package, loaded wholesale at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub scenarios: Vec<Scenario>,

    #[serde(default = "default_language_offers")]
    pub languages: Vec<LanguageOffer>,

    #[serde(default = "default_level_offers")]
    pub levels: Vec<LevelOffer>,

    #[serde(default = "default_avatars")]
    pub avatars: Vec<Avatar>,
}

impl Catalog {
    /// Build a catalog from already-parsed scenarios, using the standard
    /// selection-screen offers. Validates every scenario's corridor layout.
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, CatalogError> {
        let catalog = Self {
            scenarios,
            languages: default_language_offers(),
            levels: default_level_offers(),
            avatars: default_avatars(),
        };
        catalog.check()?;
        Ok(catalog)
    }

    /// Parse the wholesale content file.
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(source)?;
        catalog.check()?;
        Ok(catalog)
    }

    fn check(&self) -> Result<(), CatalogError> {
        if self.scenarios.is_empty() {
            return Err(CatalogError::Empty);
        }
        for scenario in &self.scenarios {
            scenario.validate()?;
        }
        Ok(())
    }

    /// Draw a scenario for a run: uniformly at random among the scenarios
    /// matching `(language, level)` whose captive is not the player's own
    /// avatar. An empty candidate set falls back deterministically to the
    /// first scenario in the catalog - a content-configuration problem worth
    /// logging, but never a reason to block the player.
    pub fn select<R: Rng>(
        &self,
        language: &LanguageId,
        level: &LevelId,
        avatar: &AvatarId,
        rng: &mut R,
    ) -> &Scenario {
        let candidates: Vec<&Scenario> = self
            .scenarios
            .iter()
            .filter(|s| &s.language == language && &s.level == level && &s.captive != avatar)
            .collect();

        if candidates.is_empty() {
            log::warn!(
                "no scenario for language={language} level={level} avatar={avatar}; \
                 falling back to the first catalog entry"
            );
            return &self.scenarios[0];
        }

        candidates[rng.gen_range(0..candidates.len())]
    }

    pub fn language_offer(&self, id: &LanguageId) -> Option<&LanguageOffer> {
        self.languages.iter().find(|offer| &offer.id == id)
    }

    pub fn level_offer(&self, id: &LevelId) -> Option<&LevelOffer> {
        self.levels.iter().find(|offer| &offer.id == id)
    }

    pub fn avatar(&self, id: &AvatarId) -> Option<&Avatar> {
        self.avatars.iter().find(|avatar| &avatar.id == id)
    }

    /// Languages every new account starts with (the free tier).
    pub fn free_languages(&self) -> impl Iterator<Item = &LanguageId> {
        self.languages
            .iter()
            .filter(|offer| offer.price == 0)
            .map(|offer| &offer.id)
    }

    /// Levels every new account starts with (the free tier).
    pub fn free_levels(&self) -> impl Iterator<Item = &LevelId> {
        self.levels
            .iter()
            .filter(|offer| offer.price == 0)
            .map(|offer| &offer.id)
    }
}

fn default_language_offers() -> Vec<LanguageOffer> {
    [
        ("english", 0),
        ("german", 100),
        ("spanish", 500),
        ("french", 500),
        ("russian", 700),
        ("italian", 700),
        ("chinese", 1000),
        ("japanese", 1000),
        ("bulgarian", 1500),
        ("portuguese", 1500),
    ]
    .into_iter()
    .map(|(id, price)| LanguageOffer {
        id: LanguageId::new(id),
        price,
    })
    .collect()
}

fn default_level_offers() -> Vec<LevelOffer> {
    [
        ("A1", "Beginner", 0),
        ("A2", "Elementary", 100),
        ("B1", "Intermediate", 200),
        ("B2", "Upper Intermediate", 300),
        ("C1", "Advanced", 400),
        ("C2", "Mastery", 500),
    ]
    .into_iter()
    .map(|(id, name, price)| LevelOffer {
        id: LevelId::new(id),
        name: name.into(),
        price,
    })
    .collect()
}

fn default_avatars() -> Vec<Avatar> {
    [
        ("king", "King", "Ruler"),
        ("queen", "Queen", "Ruler"),
        ("prince", "Prince", "Noble"),
        ("princess", "Princess", "Noble"),
        ("lord", "Lord", "Governor"),
        ("wizard", "Wizard", "Scholar"),
        ("vizier", "Vizier", "Counselor"),
        ("knight", "Knight", "Warrior"),
        ("spy", "Spy", "Shadow"),
    ]
    .into_iter()
    .map(|(id, name, role)| Avatar {
        id: AvatarId::new(id),
        name: name.into(),
        role: role.into(),
    })
    .collect()
}
