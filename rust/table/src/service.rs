//! The single-writer table service.
//!
//! One tokio task owns the [`Round`]. Everything that changes it, whether a player's bet, the
//! background driver starting the next hand, or a turn running out of time, reaches that task
//! as a message, so there is no shared mutable state to lock.

use std::path::PathBuf;
use std::time::Duration;

use rivertable_ai::{create_ai_seeded, BotSeats};
use rivertable_engine::betting::TurnOutcome;
use rivertable_engine::equity::MonteCarloEquity;
use rivertable_engine::errors::GameError;
use rivertable_engine::logger::{save_log, Street};
use rivertable_engine::player::Player;
use rivertable_engine::round::{Phase, Round};
use rivertable_engine::rules::ValidatedAction;
use rivertable_engine::snapshot::TableSnapshot;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::errors::TableError;
use crate::events::{EventBus, EventSubscription, TableEvent};
use crate::settings::{SettingsError, TableSettings};

const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, TableError>>;

enum Command {
    Snapshot(oneshot::Sender<TableSnapshot>),
    PlaceBet {
        player: String,
        amount: u32,
        reply: Reply<ValidatedAction>,
    },
    Fold {
        player: String,
        reply: Reply<()>,
    },
    NextRound(Reply<()>),
    Reset(Reply<()>),
    SetBlinds {
        small_blind: u32,
        big_blind: u32,
        reply: Reply<()>,
    },
    Shutdown(Reply<Option<PathBuf>>),
}

/// Cloneable client of a running table service.
#[derive(Debug, Clone)]
pub struct TableHandle {
    commands: mpsc::Sender<Command>,
    events: EventBus,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Snapshot(_) => "snapshot",
            Command::PlaceBet { .. } => "place_bet",
            Command::Fold { .. } => "fold",
            Command::NextRound(_) => "next_round",
            Command::Reset(_) => "reset",
            Command::SetBlinds { .. } => "set_blinds",
            Command::Shutdown(_) => "shutdown",
        };
        f.write_str(name)
    }
}

impl TableHandle {
    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, TableError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| TableError::ServiceStopped)?;
        rx.await.map_err(|_| TableError::ServiceStopped)?
    }

    pub async fn snapshot(&self) -> Result<TableSnapshot, TableError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(tx))
            .await
            .map_err(|_| TableError::ServiceStopped)?;
        rx.await.map_err(|_| TableError::ServiceStopped)
    }

    /// Puts `amount` chips in for `player`; see [`Round::place_bet`].
    pub async fn place_bet(&self, player: &str, amount: u32) -> Result<ValidatedAction, TableError> {
        let player = player.to_string();
        self.request(|reply| Command::PlaceBet {
            player,
            amount,
            reply,
        })
        .await
    }

    pub async fn fold(&self, player: &str) -> Result<(), TableError> {
        let player = player.to_string();
        self.request(|reply| Command::Fold { player, reply }).await
    }

    pub async fn next_round(&self) -> Result<(), TableError> {
        self.request(Command::NextRound).await
    }

    pub async fn reset(&self) -> Result<(), TableError> {
        self.request(Command::Reset).await
    }

    pub async fn set_blinds(&self, small_blind: u32, big_blind: u32) -> Result<(), TableError> {
        self.request(|reply| Command::SetBlinds {
            small_blind,
            big_blind,
            reply,
        })
        .await
    }

    pub fn subscribe(&self) -> EventSubscription {
        self.events.subscribe()
    }

    /// Stops the service and returns where the round log was written, if anywhere.
    pub async fn shutdown(&self) -> Result<Option<PathBuf>, TableError> {
        self.request(Command::Shutdown).await
    }
}

/// The human seat currently on the clock.
#[derive(Debug, Clone, Copy)]
struct Turn {
    seat: usize,
    hand: u32,
    deadline: Instant,
}

pub struct TableService {
    round: Round,
    bots: BotSeats,
    bus: EventBus,
    settings: TableSettings,
    turn: Option<Turn>,
    commands: mpsc::Receiver<Command>,
}

impl TableService {
    /// Validates `settings`, seats the players and starts the owning task.
    pub fn spawn(settings: TableSettings) -> Result<(TableHandle, JoinHandle<()>), TableError> {
        settings.validate()?;
        let players = settings
            .players
            .iter()
            .map(|name| Player::new(name.clone(), settings.starting_balance))
            .collect();
        let mut equity = MonteCarloEquity::new(settings.equity_iterations);
        if let Some(seed) = settings.seed {
            equity = equity.with_seed(seed);
        }
        let round = Round::new(players, settings.round_config())?.with_equity(equity);

        let mut bots = BotSeats::new();
        for (i, (player, kind)) in settings.bots.iter().enumerate() {
            let seed = settings.seed.unwrap_or(0).wrapping_add(i as u64);
            let policy = create_ai_seeded(kind, seed)
                .ok_or_else(|| SettingsError::InvalidValue(format!("unknown bot policy {}", kind)))?;
            bots.seat(player.clone(), policy);
        }

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let bus = EventBus::new();
        let service = TableService {
            round,
            bots,
            bus: bus.clone(),
            settings,
            turn: None,
            commands: rx,
        };
        tracing::info!(
            players = service.settings.players.len(),
            bots = service.bots.len(),
            "table service starting"
        );
        let task = tokio::spawn(service.run());
        Ok((
            TableHandle {
                commands: tx,
                events: bus,
            },
            task,
        ))
    }

    async fn run(mut self) {
        let mut driver = self.settings.round_interval().map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            self.drive_bots();
            let deadline = self.turn.map(|t| t.deadline);
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown(reply)) => {
                        let _ = reply.send(self.stop());
                        break;
                    }
                    Some(command) => self.handle(command),
                    None => {
                        tracing::info!("all table handles dropped");
                        if let Err(err) = self.stop() {
                            err.log("shutdown");
                        }
                        break;
                    }
                },
                _ = tick(driver.as_mut()) => self.auto_advance(),
                _ = expire(deadline) => self.expire_turn(),
            }
        }
    }

    fn handle(&mut self, command: Command) {
        tracing::trace!(command = ?command, "table command");
        match command {
            Command::Snapshot(reply) => {
                let _ = reply.send(self.round.snapshot());
            }
            Command::PlaceBet {
                player,
                amount,
                reply,
            } => {
                let result = self.round.place_bet(&player, amount).map_err(TableError::from);
                self.settle("place_bet", &result);
                let _ = reply.send(result);
            }
            Command::Fold { player, reply } => {
                let result = self.round.fold_player(&player).map_err(TableError::from);
                self.settle("fold", &result);
                let _ = reply.send(result);
            }
            Command::NextRound(reply) => {
                let result = self.round.start_hand().map_err(TableError::from);
                self.settle("next_round", &result);
                let _ = reply.send(result);
            }
            Command::Reset(reply) => {
                self.round.reset();
                self.turn = None;
                self.publish();
                let _ = reply.send(Ok(()));
            }
            Command::SetBlinds {
                small_blind,
                big_blind,
                reply,
            } => {
                let result = self
                    .round
                    .set_blinds(small_blind, big_blind)
                    .map_err(TableError::from);
                if result.is_ok() {
                    self.bus.broadcast(TableEvent::BlindsChanged {
                        small_blind,
                        big_blind,
                    });
                }
                self.settle("set_blinds", &result);
                let _ = reply.send(result);
            }
            Command::Shutdown(_) => {}
        }
    }

    /// Publishes what an operation produced; a successful one ends the current turn's clock.
    fn settle<T>(&mut self, operation: &'static str, result: &Result<T, TableError>) {
        match result {
            Ok(_) => self.turn = None,
            Err(err) => err.log(operation),
        }
        self.publish();
    }

    fn publish(&mut self) {
        let hand = self.round.hand_number();
        for event in self.round.drain_events() {
            self.bus.broadcast(TableEvent::Round { hand, event });
        }
    }

    /// Answers every bot turn in a row, then puts the next human seat on the clock.
    fn drive_bots(&mut self) {
        while let Some(request) = self.round.current_request() {
            let Some(action) = self.bots.decide(&request) else {
                self.start_clock(request.seat, &request.player, request.owed);
                return;
            };
            let result = match self.round.act_seat(request.seat, action) {
                Ok(TurnOutcome::Rejected(err)) => {
                    tracing::warn!(player = %request.player, error = %err, "bot chose an illegal action, folding it");
                    self.round.fold_player(&request.player).map(|_| ())
                }
                other => other.map(|_| ()),
            };
            if let Err(err) = result {
                TableError::from(err).log("bot_turn");
                self.round.reset();
            }
            self.publish();
        }
        self.turn = None;
    }

    fn start_clock(&mut self, seat: usize, player: &str, owed: u32) {
        let hand = self.round.hand_number();
        if matches!(self.turn, Some(t) if t.seat == seat && t.hand == hand) {
            return;
        }
        let timeout = self.settings.turn_timeout();
        self.turn = Some(Turn {
            seat,
            hand,
            deadline: Instant::now() + timeout,
        });
        tracing::debug!(hand, player, owed, "waiting for player");
        self.bus.broadcast(TableEvent::TurnStarted {
            player: player.to_string(),
            owed,
            timeout_ms: duration_ms(timeout),
            deadline: wall_clock_after(timeout),
        });
    }

    fn expire_turn(&mut self) {
        let Some(turn) = self.turn.take() else {
            return;
        };
        let awaited = self.round.current_request().map(|r| r.seat);
        if awaited != Some(turn.seat) || self.round.hand_number() != turn.hand {
            return;
        }
        let street = match self.round.phase() {
            Phase::Betting(street) => street,
            Phase::Waiting => Street::Preflop,
        };
        tracing::info!(hand = turn.hand, seat = turn.seat, street = %street, "turn timed out");
        if let Err(err) = self.round.time_out(turn.seat) {
            TableError::from(err).log("timeout");
        }
        self.publish();
    }

    fn auto_advance(&mut self) {
        if self.round.is_hand_in_progress() {
            return;
        }
        match self.round.start_hand() {
            Ok(()) => tracing::debug!(hand = self.round.hand_number(), "driver started hand"),
            Err(GameError::InsufficientBlind { player, balance, .. }) => {
                tracing::warn!(player = %player, balance, "cannot start hand: blind not covered")
            }
            Err(err) => TableError::from(err).log("auto_advance"),
        }
        self.publish();
    }

    fn stop(&mut self) -> Result<Option<PathBuf>, TableError> {
        let path = match &self.settings.log_dir {
            Some(dir) => Some(save_log(self.round.log(), dir, self.settings.save_jsonl)?),
            None => None,
        };
        tracing::info!(
            hands = self.round.hand_number(),
            log = ?path,
            "table service stopped"
        );
        self.bus.broadcast(TableEvent::Stopped {
            log_path: path.as_ref().map(|p| p.display().to_string()),
        });
        Ok(path)
    }
}

async fn tick(driver: Option<&mut tokio::time::Interval>) {
    match driver {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn wall_clock_after(d: Duration) -> chrono::DateTime<chrono::Utc> {
    let now = chrono::Utc::now();
    chrono::TimeDelta::from_std(d)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC)
}
