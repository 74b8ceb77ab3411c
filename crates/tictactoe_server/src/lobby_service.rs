//! Users and invitations: how two players end up in a game.

use tictactoe_core::MAX_COMMENT_LEN;
use tracing::{debug, info, instrument, warn};

use crate::db::{GameRecord, GameRepository, Invitation, NewInvitation, User, UserId};
use crate::error::ServiceError;

/// Longest accepted username, in characters.
pub const MAX_USERNAME_LEN: usize = 150;

/// Service layer for user registration and invitations.
///
/// Wraps [`GameRepository`] with validation and get-or-create semantics.
#[derive(Debug, Clone)]
pub struct LobbyService {
    repository: GameRepository,
}

impl LobbyService {
    /// Creates a new lobby service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: GameRepository) -> Self {
        info!("Creating LobbyService");
        Self { repository }
    }

    /// Registers a new user.
    ///
    /// Usernames are trimmed and may contain letters, digits and `@ . + - _`.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidInput`] for a bad name,
    /// [`ServiceError::UsernameTaken`] if it exists.
    #[instrument(skip(self))]
    pub fn register_user(&self, username: &str) -> Result<User, ServiceError> {
        let username = normalize_username(username)?;
        if self.repository.get_user_by_name(&username)?.is_some() {
            warn!(username = %username, "Username taken");
            return Err(ServiceError::UsernameTaken(username));
        }
        self.repository
            .create_user(username.clone())
            .map_err(|e| {
                if e.is_unique_violation() {
                    ServiceError::UsernameTaken(username)
                } else {
                    e.into()
                }
            })
    }

    /// Returns an existing user by name or creates one if not found.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidInput`] for a bad name, or a storage error.
    #[instrument(skip(self))]
    pub fn get_or_create_user(&self, username: &str) -> Result<User, ServiceError> {
        let username = normalize_username(username)?;
        if let Some(user) = self.repository.get_user_by_name(&username)? {
            debug!(user_id = user.id(), "Existing user found");
            return Ok(user);
        }
        Ok(self.repository.create_user(username)?)
    }

    /// Loads a user.
    ///
    /// # Errors
    ///
    /// [`ServiceError::UserNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn get_user(&self, user_id: UserId) -> Result<User, ServiceError> {
        self.repository
            .get_user(user_id)?
            .ok_or(ServiceError::UserNotFound(user_id))
    }

    /// All users in registration order.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    #[instrument(skip(self))]
    pub fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.repository.list_users()?)
    }

    /// Invites another user to a game.
    ///
    /// # Errors
    ///
    /// [`ServiceError::SamePlayer`], [`ServiceError::UserNotFound`] for
    /// either side, or [`ServiceError::InvalidInput`] for an overlong message.
    #[instrument(skip(self, message))]
    pub fn send_invitation(
        &self,
        from_user_id: UserId,
        to_user_id: UserId,
        message: &str,
    ) -> Result<Invitation, ServiceError> {
        if from_user_id == to_user_id {
            return Err(ServiceError::SamePlayer);
        }
        let message = message.trim();
        if message.chars().count() > MAX_COMMENT_LEN {
            return Err(ServiceError::InvalidInput(format!(
                "Message is longer than {} characters",
                MAX_COMMENT_LEN
            )));
        }
        self.get_user(from_user_id)?;
        self.get_user(to_user_id)?;

        let invitation = self.repository.create_invitation(NewInvitation::new(
            from_user_id,
            to_user_id,
            message.to_string(),
        ))?;
        info!(invitation_id = invitation.id(), "Invitation sent");
        Ok(invitation)
    }

    /// Invitations waiting for a user's answer, newest first.
    ///
    /// # Errors
    ///
    /// [`ServiceError::UserNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn invitations_for_user(&self, user_id: UserId) -> Result<Vec<Invitation>, ServiceError> {
        self.get_user(user_id)?;
        Ok(self.repository.invitations_for_user(user_id)?)
    }

    /// Accepts an invitation on behalf of its recipient and starts the game.
    ///
    /// The recipient moves first.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvitationNotFound`], or [`ServiceError::NotInvitee`]
    /// if `user_id` is not the recipient.
    #[instrument(skip(self))]
    pub fn accept_invitation(
        &self,
        invitation_id: i32,
        user_id: UserId,
    ) -> Result<GameRecord, ServiceError> {
        self.invitation_for(invitation_id, user_id)?;
        let game = self
            .repository
            .accept_invitation(invitation_id)?
            .ok_or(ServiceError::InvitationNotFound(invitation_id))?;
        info!(game_id = game.id(), "Game started from invitation");
        Ok(game)
    }

    /// Declines an invitation on behalf of its recipient.
    ///
    /// # Errors
    ///
    /// As [`LobbyService::accept_invitation`].
    #[instrument(skip(self))]
    pub fn decline_invitation(&self, invitation_id: i32, user_id: UserId) -> Result<(), ServiceError> {
        self.invitation_for(invitation_id, user_id)?;
        if !self.repository.delete_invitation(invitation_id)? {
            return Err(ServiceError::InvitationNotFound(invitation_id));
        }
        info!("Invitation declined");
        Ok(())
    }

    /// Loads an invitation and checks it is addressed to `user_id`.
    fn invitation_for(&self, invitation_id: i32, user_id: UserId) -> Result<Invitation, ServiceError> {
        let invitation = self
            .repository
            .get_invitation(invitation_id)?
            .ok_or(ServiceError::InvitationNotFound(invitation_id))?;
        if *invitation.to_user_id() != user_id {
            warn!(
                invitation_id,
                user_id,
                to = invitation.to_user_id(),
                "User is not the invitee"
            );
            return Err(ServiceError::NotInvitee(invitation_id));
        }
        Ok(invitation)
    }
}

/// Trims a username and checks its length and characters.
fn normalize_username(raw: &str) -> Result<String, ServiceError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(ServiceError::InvalidInput("Username is required".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ServiceError::InvalidInput(format!(
            "Username is longer than {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if let Some(bad) = username
        .chars()
        .find(|c| !(c.is_alphanumeric() || "@.+-_".contains(*c)))
    {
        return Err(ServiceError::InvalidInput(format!(
            "Username may not contain '{}'",
            bad
        )));
    }
    Ok(username.to_string())
}
