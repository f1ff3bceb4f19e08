//! Line-based console: reads commands from stdin and prints broadcast events.

use std::str::FromStr;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use combat_core::{ActorId, ActorSnapshot};
use runtime::{EncounterEvent, Event, RuntimeHandle, Topic};

/// A parsed console line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Attack,
    Defend,
    Target(String),
    Status,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("usage: target <name>")]
    MissingTarget,
}

impl FromStr for ConsoleCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

        match verb.to_ascii_lowercase().as_str() {
            "" => Err(ParseCommandError::Empty),
            "attack" | "a" => Ok(Self::Attack),
            "defend" | "d" => Ok(Self::Defend),
            "target" | "t" if rest.is_empty() => Err(ParseCommandError::MissingTarget),
            "target" | "t" => Ok(Self::Target(rest.to_owned())),
            "status" | "s" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(ParseCommandError::Unknown(other.to_owned())),
        }
    }
}

const HELP: &str = "commands: attack | defend | target <name> | status | help | quit";

enum Flow {
    Continue,
    Quit,
}

/// Drives one player-controlled actor from stdin.
pub struct Console {
    handle: RuntimeHandle,
    player: ActorId,
    show_ambient: bool,
}

impl Console {
    pub fn new(handle: RuntimeHandle, player: ActorId, show_ambient: bool) -> Self {
        Self {
            handle,
            player,
            show_ambient,
        }
    }

    pub async fn run(self) -> Result<()> {
        let mut combat = self.handle.subscribe(Topic::Combat);
        let mut ambient = self.handle.subscribe(Topic::Ambient);
        let mut feedback = self.handle.subscribe(Topic::Feedback);
        let mut encounter = self.handle.subscribe(Topic::Encounter);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("{HELP}");
        self.print_status().await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if let Flow::Quit = self.execute(&line).await? {
                        break;
                    }
                }
                event = combat.recv() => self.print_event(event),
                event = feedback.recv() => self.print_event(event),
                event = encounter.recv() => self.print_event(event),
                event = ambient.recv(), if self.show_ambient => self.print_event(event),
            }
        }

        Ok(())
    }

    async fn execute(&self, line: &str) -> Result<Flow> {
        let command = match line.parse::<ConsoleCommand>() {
            Ok(command) => command,
            Err(ParseCommandError::Empty) => return Ok(Flow::Continue),
            Err(err) => {
                println!("{err}");
                return Ok(Flow::Continue);
            }
        };
        tracing::debug!(?command, "console command");

        match command {
            ConsoleCommand::Attack => self.act(self.handle.attack(self.player).await)?,
            ConsoleCommand::Defend => self.act(self.handle.defend(self.player).await)?,
            ConsoleCommand::Target(name) => match self.handle.find_actor(name.as_str()).await? {
                Some(target) => {
                    self.handle.set_target(self.player, Some(target)).await?;
                    println!("now targeting {name}");
                }
                None => println!("no actor named {name}"),
            },
            ConsoleCommand::Status => self.print_status().await?,
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Refusals are already printed from the feedback topic.
    fn act<T>(&self, result: runtime::Result<T>) -> Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(err) if err.as_illegal().is_some() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn print_status(&self) -> Result<()> {
        let actors = self.handle.query_actors().await?;
        for actor in &actors {
            println!("{}", status_line(actor, &actors, actor.id == self.player));
        }
        Ok(())
    }

    fn print_event(&self, event: Result<Event, RecvError>) {
        match event {
            Ok(Event::Encounter(EncounterEvent::Finished { outcome })) => {
                println!("*** encounter over: {outcome} ***");
            }
            Ok(Event::Encounter(_)) => {}
            Ok(event) => {
                if let Some(notice) = event.notice() {
                    println!("{notice}");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "console fell behind the event bus");
            }
            Err(RecvError::Closed) => {}
        }
    }
}

fn status_line(actor: &ActorSnapshot, all: &[ActorSnapshot], is_player: bool) -> String {
    let marker = if is_player { '>' } else { ' ' };
    let target = actor
        .target
        .and_then(|id| all.iter().find(|other| other.id == id))
        .map_or("-", |other| other.name.as_str());
    format!(
        "{marker} {:<16} {:>4}/{:<4} {:<10} target: {}",
        actor.name, actor.health, actor.max_health, actor.state, target
    )
}

/// Picks the actor the console controls.
pub fn resolve_player(actors: &[ActorSnapshot], wanted: Option<&str>) -> Option<ActorId> {
    actors
        .iter()
        .find(|actor| match wanted {
            Some(name) => actor.name == name,
            None => actor.control == combat_core::Control::Player,
        })
        .map(|actor| actor.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ActorState, Control};

    fn snapshot(id: u32, name: &str, control: Control) -> ActorSnapshot {
        ActorSnapshot {
            id: ActorId(id),
            name: name.to_owned(),
            control,
            health: 100,
            max_health: 100,
            state: ActorState::Idle,
            defense: false,
            target: None,
            action_pending: false,
        }
    }

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!("attack".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Attack));
        assert_eq!("  D ".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Defend));
        assert_eq!(
            "target Skeleton Archer".parse::<ConsoleCommand>(),
            Ok(ConsoleCommand::Target("Skeleton Archer".to_owned()))
        );
        assert_eq!("quit".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("".parse::<ConsoleCommand>(), Err(ParseCommandError::Empty));
        assert_eq!(
            "target".parse::<ConsoleCommand>(),
            Err(ParseCommandError::MissingTarget)
        );
        assert_eq!(
            "dance".parse::<ConsoleCommand>(),
            Err(ParseCommandError::Unknown("dance".to_owned()))
        );
    }

    #[test]
    fn resolves_first_player_by_default() {
        let actors = vec![
            snapshot(0, "Skeleton", Control::Autonomous),
            snapshot(1, "Hero", Control::Player),
            snapshot(2, "Squire", Control::Player),
        ];

        assert_eq!(resolve_player(&actors, None), Some(ActorId(1)));
        assert_eq!(resolve_player(&actors, Some("Squire")), Some(ActorId(2)));
        assert_eq!(resolve_player(&actors, Some("Nobody")), None);
    }

    #[test]
    fn status_line_names_the_target() {
        let mut hero = snapshot(0, "Hero", Control::Player);
        hero.target = Some(ActorId(1));
        let actors = vec![hero.clone(), snapshot(1, "Skeleton", Control::Autonomous)];

        let line = status_line(&hero, &actors, true);

        assert!(line.starts_with("> Hero"));
        assert!(line.ends_with("target: Skeleton"));
    }
}
