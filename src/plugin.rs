//! Headless Bevy integration.
//!
//! `PlayerCommand` events go in, `GameLogEvent`s come out. The session lives
//! in a resource and every queued command is applied in order during one
//! `Update` run.

use bevy::app::{App, Plugin, Update};
use bevy::ecs::prelude::{Event, EventReader, EventWriter, ResMut, Resource};

use crate::command::PlayerCommand;
use crate::config::GameConfig;
use crate::rng::{Dice, HashIdGenerator, SeededDice};
use crate::session::{GameEvent, GameSession};
use crate::storage::FileStore;

#[derive(Resource, Debug)]
pub struct SessionResource(pub GameSession);

/// One line of the game log feed
#[derive(Event, Debug, Clone, PartialEq)]
pub struct GameLogEvent(pub GameEvent);

impl GameLogEvent {
    pub fn message(&self) -> String {
        self.0.to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PassiveTreePlugin {
    pub config: GameConfig,
}

impl PassiveTreePlugin {
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    /// File-backed session as described by the config
    pub fn build_session(&self) -> GameSession {
        let catalog = match self.config.catalog() {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "catalog document rejected, using built-in catalog");
                crate::catalog::Catalog::standard()
            }
        };
        let dice: Box<dyn Dice> = match self.config.seed {
            Some(seed) => Box::new(SeededDice::from_seed(seed)),
            None => Box::new(SeededDice::from_entropy()),
        };
        GameSession::new(
            catalog,
            Box::new(FileStore::new(self.config.data_dir.clone())),
            dice,
            Box::new(HashIdGenerator::from_entropy()),
        )
    }
}

impl Plugin for PassiveTreePlugin {
    fn build(&self, app: &mut App) {
        // a pre-inserted session (tests, embedding hosts) wins
        if !app.world().contains_resource::<SessionResource>() {
            app.insert_resource(SessionResource(self.build_session()));
        }
        app.add_event::<PlayerCommand>()
            .add_event::<GameLogEvent>()
            .add_systems(Update, process_commands);
    }
}

fn process_commands(
    mut commands: EventReader<PlayerCommand>,
    mut session: ResMut<SessionResource>,
    mut log: EventWriter<GameLogEvent>,
) {
    for command in commands.read() {
        tracing::debug!(?command, "applying command");
        session.0.apply(command);
    }
    for event in session.0.drain_events() {
        log.send(GameLogEvent(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::event::Events;

    fn app_with(session: GameSession) -> App {
        let mut app = App::new();
        app.insert_resource(SessionResource(session));
        app.add_plugins(PassiveTreePlugin::default());
        app
    }

    fn drain_log(app: &mut App) -> Vec<GameEvent> {
        app.world_mut()
            .resource_mut::<Events<GameLogEvent>>()
            .drain()
            .map(|e| e.0)
            .collect()
    }

    #[test]
    fn test_commands_applied_in_order() {
        let mut app = app_with(GameSession::in_memory(3));
        app.world_mut().send_event(PlayerCommand::Create {
            name: "Ash".into(),
            class_id: "red".into(),
        });
        app.world_mut()
            .send_event(PlayerCommand::Allocate("flame-wheel".into()));
        app.update();

        let session = &app.world().resource::<SessionResource>().0;
        let active = session.active().unwrap();
        assert!(active.has_node("flame-wheel"));
        assert_eq!(active.points, 0);

        let log = drain_log(&mut app);
        assert!(matches!(log[0], GameEvent::CharacterCreated { .. }));
        assert!(matches!(log[1], GameEvent::NodeAllocated { .. }));
    }

    #[test]
    fn test_rejected_creation_logged() {
        let mut app = app_with(GameSession::in_memory(3));
        app.world_mut().send_event(PlayerCommand::Create {
            name: " ".into(),
            class_id: "red".into(),
        });
        app.update();
        let messages: Vec<String> = drain_log(&mut app).iter().map(ToString::to_string).collect();
        assert_eq!(messages, vec!["Enter a name and choose a class."]);
    }

    #[test]
    fn test_run_map_through_app() {
        let mut app = app_with(GameSession::in_memory(8));
        for command in [
            PlayerCommand::Create {
                name: "Rin".into(),
                class_id: "blue".into(),
            },
            PlayerCommand::SelectMap("verdant-hollow".into()),
            PlayerCommand::RunMap,
        ] {
            app.world_mut().send_event(command);
        }
        app.update();
        let log = drain_log(&mut app);
        let resolved = log
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::EncounterWon { .. } | GameEvent::EncounterLost { .. }
                )
            })
            .count();
        assert_eq!(resolved, 4);
        assert!(matches!(log.last(), Some(GameEvent::MapRunFinished { .. })));
    }

    #[test]
    fn test_file_backed_session_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig {
            seed: Some(1),
            data_dir: dir.path().to_path_buf(),
            ..GameConfig::default()
        };
        let mut app = App::new();
        app.add_plugins(PassiveTreePlugin::new(config.clone()));
        app.world_mut().send_event(PlayerCommand::Create {
            name: "Ash".into(),
            class_id: "green".into(),
        });
        app.update();

        let reopened = PassiveTreePlugin::new(config).build_session();
        assert_eq!(reopened.active().unwrap().name, "Ash");
        assert_eq!(reopened.active().unwrap().allocated, vec!["verdant-core"]);
    }
}
