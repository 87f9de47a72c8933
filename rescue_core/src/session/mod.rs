//! Game session - the state machine from the main menu to victory.
//!
//! A [`GameSession`] owns the catalog, the player's ledger, and (while
//! playing) a [`RunEngine`]. Selection screens go through it so that locked
//! content is purchased through the ledger before it can be picked, and run
//! rewards are credited as the run emits them.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use quiz_rules::{AvatarId, Catalog, LanguageId, LevelId};

use crate::economy::{EconomyError, Ledger, UnlockItem};
use crate::events::EngineEvent;
use crate::run::RunEngine;

/// Where the player is in the menu-to-victory flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Menu,
    LanguageSelected,
    LevelSelected,
    AvatarSelected,
    StoryIntro,
    Playing,
    Victory,
}

/// Result of picking an item on a selection screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Already owned; the selection advanced.
    Selected,
    /// Was locked; the purchase went through. The player confirms again to
    /// advance, mirroring a buy dialog that closes back to the screen.
    Unlocked,
    /// Locked and unaffordable. `shortfall` is how much gold is missing.
    PurchaseRequired { shortfall: u32 },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown catalog item: {0}")]
    UnknownItem(String),

    #[error("action not available in the current phase")]
    WrongPhase,

    #[error(transparent)]
    Economy(#[from] EconomyError),
}

/// The top-level game context handed to the UI shell.
pub struct GameSession {
    catalog: Catalog,
    ledger: Ledger,
    phase: GamePhase,
    language: Option<LanguageId>,
    level: Option<LevelId>,
    avatar: Option<AvatarId>,
    run: Option<RunEngine>,
    rng: Pcg32,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.phase)
            .field("language", &self.language)
            .field("level", &self.level)
            .field("avatar", &self.avatar)
            .finish()
    }
}

impl GameSession {
    pub fn new(catalog: Catalog, ledger: Ledger, seed: u64) -> Self {
        Self {
            catalog,
            ledger,
            phase: GamePhase::Menu,
            language: None,
            level: None,
            avatar: None,
            run: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// The active run, while in the `Playing` phase.
    pub fn run(&self) -> Option<&RunEngine> {
        self.run.as_ref()
    }

    pub fn run_mut(&mut self) -> Option<&mut RunEngine> {
        self.run.as_mut()
    }

    /// Pick a language on the first selection screen. Locked languages are
    /// bought through the ledger; an owned pick advances the phase.
    pub fn select_language(&mut self, id: &LanguageId) -> Result<SelectionOutcome, SessionError> {
        if self.phase != GamePhase::Menu && self.phase != GamePhase::LanguageSelected {
            return Err(SessionError::WrongPhase);
        }
        let offer = self
            .catalog
            .language_offer(id)
            .ok_or_else(|| SessionError::UnknownItem(id.to_string()))?;

        if !self.ledger.account().has_language(id) {
            let price = offer.price;
            return match self.ledger.purchase(UnlockItem::Language(id.clone()), price) {
                Ok(()) => Ok(SelectionOutcome::Unlocked),
                Err(EconomyError::InsufficientFunds { shortfall }) => {
                    Ok(SelectionOutcome::PurchaseRequired { shortfall })
                }
                Err(error) => Err(error.into()),
            };
        }

        self.language = Some(id.clone());
        self.phase = GamePhase::LanguageSelected;
        Ok(SelectionOutcome::Selected)
    }

    /// Pick a proficiency level, after a language is selected.
    pub fn select_level(&mut self, id: &LevelId) -> Result<SelectionOutcome, SessionError> {
        if self.phase != GamePhase::LanguageSelected && self.phase != GamePhase::LevelSelected {
            return Err(SessionError::WrongPhase);
        }
        let offer = self
            .catalog
            .level_offer(id)
            .ok_or_else(|| SessionError::UnknownItem(id.to_string()))?;

        if !self.ledger.account().has_level(id) {
            let price = offer.price;
            return match self.ledger.purchase(UnlockItem::Level(id.clone()), price) {
                Ok(()) => Ok(SelectionOutcome::Unlocked),
                Err(EconomyError::InsufficientFunds { shortfall }) => {
                    Ok(SelectionOutcome::PurchaseRequired { shortfall })
                }
                Err(error) => Err(error.into()),
            };
        }

        self.level = Some(id.clone());
        self.phase = GamePhase::LevelSelected;
        Ok(SelectionOutcome::Selected)
    }

    /// Pick the player's avatar. Avatars are free; the roster is fixed.
    pub fn select_avatar(&mut self, id: &AvatarId) -> Result<(), SessionError> {
        if self.phase != GamePhase::LevelSelected && self.phase != GamePhase::AvatarSelected {
            return Err(SessionError::WrongPhase);
        }
        if self.catalog.avatar(id).is_none() {
            return Err(SessionError::UnknownItem(id.to_string()));
        }

        self.avatar = Some(id.clone());
        self.phase = GamePhase::AvatarSelected;
        Ok(())
    }

    /// Draw a scenario for the chosen language, level, and avatar, and show
    /// its story intro.
    pub fn begin_story(&mut self) -> Result<(), SessionError> {
        if self.phase != GamePhase::AvatarSelected {
            return Err(SessionError::WrongPhase);
        }
        let (Some(language), Some(level), Some(avatar)) =
            (&self.language, &self.level, &self.avatar)
        else {
            return Err(SessionError::WrongPhase);
        };

        let scenario = self
            .catalog
            .select(language, level, avatar, &mut self.rng)
            .clone();
        let seed = self.rng.gen();
        self.run = Some(RunEngine::new(scenario, seed));
        self.phase = GamePhase::StoryIntro;
        Ok(())
    }

    /// Dismiss the story intro and enter the corridor.
    pub fn confirm_story(&mut self) -> Result<(), SessionError> {
        if self.phase != GamePhase::StoryIntro {
            return Err(SessionError::WrongPhase);
        }
        self.phase = GamePhase::Playing;
        Ok(())
    }

    /// Drain the run's events, credit its rewards, and advance the phase on
    /// victory. Called once per frame by the shell; returns the drained
    /// events for presentation.
    pub fn pump(&mut self) -> Vec<EngineEvent> {
        let Some(run) = self.run.as_mut() else {
            return Vec::new();
        };
        let events = run.drain_events();

        for event in &events {
            match event {
                EngineEvent::CurrencyAwarded(amount) => {
                    if let Err(error) = self.ledger.credit(*amount) {
                        log::warn!("failed to credit run reward: {error}");
                    }
                }
                EngineEvent::Victory => {
                    self.phase = GamePhase::Victory;
                }
                _ => {}
            }
        }

        events
    }

    /// Quit the active run. Earned currency is kept; run progress is not.
    pub fn abandon(&mut self) {
        self.run = None;
        self.phase = GamePhase::Menu;
        self.language = None;
        self.level = None;
        self.avatar = None;
    }

    /// Leave the victory screen.
    pub fn return_to_menu(&mut self) {
        self.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::{Account, MemoryStore, UserId};
    use quiz_rules::{
        Challenge, Question, QuestionId, Riddle, Scenario, ScenarioId, Submission,
    };

    fn catalog() -> Catalog {
        let questions = vec![Question {
            id: QuestionId(1),
            prompt: "Find the synonym of 'big'.".into(),
            story_text: None,
            depth: -20.0,
            challenge: Challenge::Synonym {
                answer: "huge".into(),
            },
        }];
        Catalog::new(vec![
            Scenario {
                id: ScenarioId::new("rescue_king"),
                language: LanguageId::new("english"),
                level: LevelId::new("A1"),
                captive: AvatarId::new("king"),
                captive_name: "King George".into(),
                title: "The Golden Crown".into(),
                intro: "The king is captured.".into(),
                final_riddle: Riddle {
                    prompt: "riddle".into(),
                    answer: "A clock".into(),
                    choices: vec!["A clock".into()],
                },
                questions: questions.clone(),
            },
            Scenario {
                id: ScenarioId::new("rescue_queen_de"),
                language: LanguageId::new("german"),
                level: LevelId::new("A1"),
                captive: AvatarId::new("queen"),
                captive_name: "Queen Anne".into(),
                title: "Die Goldene Krone".into(),
                intro: "Die Königin ist gefangen.".into(),
                final_riddle: Riddle {
                    prompt: "riddle".into(),
                    answer: "A clock".into(),
                    choices: vec!["A clock".into()],
                },
                questions,
            },
        ])
        .unwrap()
    }

    fn session() -> GameSession {
        let catalog = catalog();
        let ledger = Ledger::open(
            UserId::new(),
            Box::new(MemoryStore::new()),
            Account::starter(&catalog),
        )
        .unwrap();
        GameSession::new(catalog, ledger, 3)
    }

    #[test]
    fn test_free_tier_selection_advances() {
        let mut session = session();
        assert_eq!(session.phase(), GamePhase::Menu);

        let outcome = session.select_language(&LanguageId::new("english")).unwrap();
        assert_eq!(outcome, SelectionOutcome::Selected);
        assert_eq!(session.phase(), GamePhase::LanguageSelected);

        let outcome = session.select_level(&LevelId::new("A1")).unwrap();
        assert_eq!(outcome, SelectionOutcome::Selected);
        assert_eq!(session.phase(), GamePhase::LevelSelected);
    }

    #[test]
    fn test_locked_language_requires_purchase() {
        let mut session = session();

        let outcome = session.select_language(&LanguageId::new("german")).unwrap();
        assert_eq!(outcome, SelectionOutcome::PurchaseRequired { shortfall: 100 });
        // Nothing advanced or was deducted.
        assert_eq!(session.phase(), GamePhase::Menu);
        assert_eq!(session.ledger().balance(), 0);
    }

    #[test]
    fn test_purchase_then_select() {
        let mut session = session();
        session.ledger_mut().credit(150).unwrap();

        let outcome = session.select_language(&LanguageId::new("german")).unwrap();
        assert_eq!(outcome, SelectionOutcome::Unlocked);
        assert_eq!(session.ledger().balance(), 50);
        // The unlock does not auto-advance; a second pick does.
        assert_eq!(session.phase(), GamePhase::Menu);

        let outcome = session.select_language(&LanguageId::new("german")).unwrap();
        assert_eq!(outcome, SelectionOutcome::Selected);
        assert_eq!(session.phase(), GamePhase::LanguageSelected);
    }

    #[test]
    fn test_unknown_language_rejected() {
        let mut session = session();
        assert!(matches!(
            session.select_language(&LanguageId::new("klingon")),
            Err(SessionError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_phase_order_enforced() {
        let mut session = session();
        assert!(matches!(
            session.select_level(&LevelId::new("A1")),
            Err(SessionError::WrongPhase)
        ));
        assert!(matches!(session.begin_story(), Err(SessionError::WrongPhase)));
    }

    #[test]
    fn test_avatar_excluded_from_draw() {
        let mut session = session();
        session.select_language(&LanguageId::new("english")).unwrap();
        session.select_level(&LevelId::new("A1")).unwrap();
        session.select_avatar(&AvatarId::new("queen")).unwrap();
        session.begin_story().unwrap();

        // The only english A1 story rescues the king; playing the queen is
        // fine, the draw just may never hand back her own capture.
        let scenario_id = session.run().unwrap().scenario().id.clone();
        assert_eq!(scenario_id, ScenarioId::new("rescue_king"));
        assert_eq!(session.phase(), GamePhase::StoryIntro);
    }

    #[test]
    fn test_full_session_to_victory() {
        let mut session = session();
        session.select_language(&LanguageId::new("english")).unwrap();
        session.select_level(&LevelId::new("A1")).unwrap();
        session.select_avatar(&AvatarId::new("spy")).unwrap();
        session.begin_story().unwrap();
        session.confirm_story().unwrap();
        assert_eq!(session.phase(), GamePhase::Playing);

        // Walk to the gate and answer it.
        {
            let run = session.run_mut().unwrap();
            run.set_move_held(true);
            while run.nearby_interactable().is_none() {
                run.tick(0.05);
            }
            run.set_move_held(false);
            run.interact();
            run.submit(&Submission::Text("huge".into()));
        }
        session.pump();
        assert_eq!(session.ledger().balance(), crate::run::GATE_REWARD);

        // Force the endgame rather than replaying the whole corridor.
        {
            let run = session.run_mut().unwrap();
            run.progress_mut().has_key = true;
            run.progress_mut().chest_opened = true;
            run.progress_mut().depth = quiz_rules::RESCUE_DEPTH;
            run.tick(0.05);
        }
        let events = session.pump();
        assert!(events.contains(&EngineEvent::Victory));
        assert_eq!(session.phase(), GamePhase::Victory);
        assert_eq!(
            session.ledger().balance(),
            crate::run::GATE_REWARD + crate::run::VICTORY_REWARD
        );

        session.return_to_menu();
        assert_eq!(session.phase(), GamePhase::Menu);
        assert!(session.run().is_none());
        // Currency earned in the run is kept.
        assert_eq!(
            session.ledger().balance(),
            crate::run::GATE_REWARD + crate::run::VICTORY_REWARD
        );
    }

    #[test]
    fn test_abandon_keeps_currency() {
        let mut session = session();
        session.select_language(&LanguageId::new("english")).unwrap();
        session.select_level(&LevelId::new("A1")).unwrap();
        session.select_avatar(&AvatarId::new("spy")).unwrap();
        session.begin_story().unwrap();
        session.confirm_story().unwrap();

        session.ledger_mut().credit(20).unwrap();
        session.abandon();

        assert_eq!(session.phase(), GamePhase::Menu);
        assert!(session.run().is_none());
        assert_eq!(session.ledger().balance(), 20);
    }
}
