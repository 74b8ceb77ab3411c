//! Shared fixtures for server integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use tempfile::NamedTempFile;
use tictactoe_core::{GameStatus, Move};
use tictactoe_server::{
    DbError, GameRecord, GameRepository, GameStore, MoveRecord, User, UserId,
};

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
pub fn setup_test_db() -> (NamedTempFile, GameRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = GameRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    (db_file, repo)
}

/// Registers two users and returns them.
pub fn two_users(repo: &GameRepository) -> (User, User) {
    let alice = repo
        .create_user("alice".to_string())
        .expect("Create failed");
    let bob = repo.create_user("bob".to_string()).expect("Create failed");
    (alice, bob)
}

fn stamp() -> NaiveDateTime {
    chrono::DateTime::from_timestamp(0, 0)
        .expect("Valid timestamp")
        .naive_utc()
}

#[derive(Debug, Default)]
struct Tables {
    games: Vec<GameRecord>,
    moves: Vec<MoveRecord>,
}

/// In-memory [`GameStore`]; one lock serializes every call.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Number of stored moves across all games.
    pub fn move_count(&self) -> usize {
        self.tables.lock().expect("Lock poisoned").moves.len()
    }

    /// Forces a game's status, bypassing the engine.
    pub fn set_status(&self, game_id: i32, status: GameStatus) {
        let mut tables = self.tables.lock().expect("Lock poisoned");
        let game = tables
            .games
            .iter_mut()
            .find(|g| *g.id() == game_id)
            .expect("Unknown game");
        *game = with_status(game, status.code());
    }
}

fn with_status(game: &GameRecord, status: &str) -> GameRecord {
    GameRecord::new(
        *game.id(),
        *game.first_player_id(),
        *game.second_player_id(),
        status.to_string(),
        *game.start_time(),
        *game.last_active(),
    )
}

fn newest_first(mut games: Vec<GameRecord>) -> Vec<GameRecord> {
    games.sort_by(|a, b| {
        b.last_active()
            .cmp(a.last_active())
            .then(b.id().cmp(a.id()))
    });
    games
}

impl GameStore for MemoryStore {
    fn create_game(
        &self,
        first_player_id: UserId,
        second_player_id: UserId,
    ) -> Result<GameRecord, DbError> {
        let mut tables = self.tables.lock().expect("Lock poisoned");
        let game = GameRecord::new(
            tables.games.len() as i32 + 1,
            first_player_id,
            second_player_id,
            GameStatus::FirstToMove.code().to_string(),
            stamp(),
            stamp(),
        );
        tables.games.push(game.clone());
        Ok(game)
    }

    fn get_game(&self, game_id: i32) -> Result<Option<GameRecord>, DbError> {
        let tables = self.tables.lock().expect("Lock poisoned");
        Ok(tables.games.iter().find(|g| *g.id() == game_id).cloned())
    }

    fn moves_for_game(&self, game_id: i32) -> Result<Vec<MoveRecord>, DbError> {
        let tables = self.tables.lock().expect("Lock poisoned");
        Ok(tables
            .moves
            .iter()
            .filter(|m| *m.game_id() == game_id)
            .cloned()
            .collect())
    }

    fn games_for_user(&self, user_id: UserId) -> Result<Vec<GameRecord>, DbError> {
        let tables = self.tables.lock().expect("Lock poisoned");
        Ok(newest_first(
            tables
                .games
                .iter()
                .filter(|g| g.involves(user_id))
                .cloned()
                .collect(),
        ))
    }

    fn active_games(&self) -> Result<Vec<GameRecord>, DbError> {
        let tables = self.tables.lock().expect("Lock poisoned");
        Ok(newest_first(
            tables
                .games
                .iter()
                .filter(|g| g.parse_status().map(GameStatus::is_active).unwrap_or(false))
                .cloned()
                .collect(),
        ))
    }

    fn append_move<E, F>(
        &self,
        game_id: i32,
        decide: F,
    ) -> Result<Option<(GameRecord, MoveRecord)>, E>
    where
        E: From<DbError>,
        F: FnOnce(&GameRecord, &[MoveRecord]) -> Result<(Move, GameStatus), E>,
    {
        let mut tables = self.tables.lock().expect("Lock poisoned");
        let Some(index) = tables.games.iter().position(|g| *g.id() == game_id) else {
            return Ok(None);
        };
        let history: Vec<MoveRecord> = tables
            .moves
            .iter()
            .filter(|m| *m.game_id() == game_id)
            .cloned()
            .collect();

        let (mv, status) = decide(&tables.games[index], &history)?;

        let stored = MoveRecord::new(
            tables.moves.len() as i32 + 1,
            game_id,
            mv.x,
            mv.y,
            mv.comment.clone(),
            mv.mover.is_first(),
            stamp(),
        );
        tables.moves.push(stored.clone());
        let updated = with_status(&tables.games[index], status.code());
        tables.games[index] = updated.clone();
        Ok(Some((updated, stored)))
    }

    fn update_move_comment(
        &self,
        move_id: i32,
        comment: &str,
    ) -> Result<Option<MoveRecord>, DbError> {
        let mut tables = self.tables.lock().expect("Lock poisoned");
        let Some(record) = tables.moves.iter_mut().find(|m| *m.id() == move_id) else {
            return Ok(None);
        };
        *record = MoveRecord::new(
            *record.id(),
            *record.game_id(),
            *record.x(),
            *record.y(),
            comment.to_string(),
            *record.by_first_player(),
            *record.created_at(),
        );
        Ok(Some(record.clone()))
    }
}
