use chrono::Duration;

use medgate_auth_types::token::{SESSION_DURATION_HOURS, generate_session_token};
use medgate_core::clock::Clock;
use medgate_domain::id::UserId;
use medgate_domain::role::UserRole;

use crate::domain::repository::SessionRepository;
use crate::domain::types::Session;
use crate::error::RecordsServiceError;

/// Issues, validates and revokes bearer sessions.
pub struct SessionStore<S, C>
where
    S: SessionRepository,
    C: Clock,
{
    pub sessions: S,
    pub clock: C,
}

impl<S, C> SessionStore<S, C>
where
    S: SessionRepository,
    C: Clock,
{
    /// Open a session that lasts [`SESSION_DURATION_HOURS`].
    pub async fn create(
        &self,
        user_id: UserId,
        role: UserRole,
    ) -> Result<Session, RecordsServiceError> {
        let now = self.clock.now();
        let session = Session {
            token: generate_session_token(),
            user_id,
            role,
            created_at: now,
            expires_at: now + Duration::hours(SESSION_DURATION_HOURS),
        };
        self.sessions.create(&session).await?;
        Ok(session)
    }

    /// Resolve a presented token to its session.
    ///
    /// An expired session is deleted before `SessionExpired` is returned, so presenting the
    /// same token again yields `InvalidSession`.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Session, RecordsServiceError> {
        let token = token.ok_or(RecordsServiceError::MissingToken)?;
        let session = self
            .sessions
            .find(token)
            .await?
            .ok_or(RecordsServiceError::InvalidSession)?;

        if session.is_expired_at(self.clock.now()) {
            self.sessions.delete(token).await?;
            tracing::debug!(user_id = %session.user_id, "evicted expired session");
            return Err(RecordsServiceError::SessionExpired);
        }

        Ok(session)
    }

    pub async fn revoke(&self, token: &str) -> Result<(), RecordsServiceError> {
        self.sessions.delete(token).await
    }
}
