//! Session coordinator implementation

use std::sync::Arc;

use tp_shared::{SessionConfig, TokenConfig};
use uuid::Uuid;

use crate::domain::entities::session::SessionRecord;
use crate::domain::entities::token::{ClaimMap, TokenKind, TokenPair, VerifiedToken};
use crate::errors::{DomainResult, TokenError};
use crate::repositories::cache::CacheEngine;
use crate::services::token::TokenCodec;

/// Issues, verifies, rotates and revokes token pairs.
///
/// With a cache engine every pair is backed by a [`SessionRecord`] and a
/// per-subject index of session ids. Without one the coordinator only signs
/// and checks tokens: nothing can be revoked and rotation always succeeds.
///
/// # Concurrency
///
/// Single-session eviction followed by insertion, and rotation (delete the
/// old record, then issue) are separate cache calls, not a transaction.
/// Rotation claims the old record through `delete`, so of two concurrent
/// rotations of one refresh token only the caller whose delete removed the
/// record gets a new pair; the other fails with `NotValidSession`. Two
/// concurrent single-session issuances may still both survive until the
/// next issuance for that subject.
#[derive(Clone)]
pub struct SessionCoordinator {
    codec: TokenCodec,
    cache: Option<Arc<dyn CacheEngine>>,
    config: SessionConfig,
}

impl SessionCoordinator {
    /// Create a coordinator
    ///
    /// # Arguments
    ///
    /// * `token_config` - Signing secret, lifetimes and leeway
    /// * `cache` - Session store; `None` runs the coordinator cacheless
    /// * `config` - Session policy and cache key prefix
    pub fn new(
        token_config: TokenConfig,
        cache: Option<Arc<dyn CacheEngine>>,
        config: SessionConfig,
    ) -> DomainResult<Self> {
        let codec = TokenCodec::new(token_config)?;

        tracing::info!(
            cacheless = cache.is_none(),
            multi_session = config.multi_session,
            key_prefix = %config.key_prefix,
            "Session coordinator created"
        );

        Ok(Self { codec, cache, config })
    }

    /// Coordinator without session tracking
    pub fn cacheless(token_config: TokenConfig) -> DomainResult<Self> {
        Self::new(token_config, None, SessionConfig::default())
    }

    /// Coordinator tracking sessions in `cache` under the default key prefix
    pub fn with_cache(
        token_config: TokenConfig,
        cache: Arc<dyn CacheEngine>,
        multi_session: bool,
    ) -> DomainResult<Self> {
        let config = if multi_session {
            SessionConfig::multi_session()
        } else {
            SessionConfig::single_session()
        };
        Self::new(token_config, Some(cache), config)
    }

    pub fn is_cacheless(&self) -> bool {
        self.cache.is_none()
    }

    pub fn is_multi_session(&self) -> bool {
        self.config.multi_session
    }

    /// Underlying token codec
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issue a new token pair for `subject` under a fresh session id.
    ///
    /// In single-session mode every existing session of the subject is
    /// removed before the new one is recorded.
    pub async fn issue_pair(
        &self,
        subject: &str,
        payload: Option<ClaimMap>,
        header: Option<ClaimMap>,
    ) -> DomainResult<TokenPair> {
        let sid = Uuid::new_v4().to_string();

        if let Some(cache) = self.cache.as_deref() {
            if !self.config.multi_session {
                let evicted = self.drop_all_sessions(cache, subject).await?;
                if evicted > 0 {
                    tracing::info!(
                        subject = subject,
                        evicted = evicted,
                        "Evicted previous sessions in single-session mode"
                    );
                }
            }

            let refresh_ttl = self.codec.config().refresh_ttl;
            let record = SessionRecord::new(&sid, subject, payload.clone(), header.clone());
            cache
                .set(&self.session_key(&sid), &record.to_json()?, Some(refresh_ttl))
                .await?;

            let index = self.index_key(subject);
            cache.list_push_front(&index, &sid).await?;
            cache.update_ttl(&index, refresh_ttl).await?;
        }

        let pair = self.mint(subject, &sid, payload, header)?;

        tracing::info!(
            subject = subject,
            sid = %sid,
            event = "session_issued",
            "Issued token pair"
        );

        Ok(pair)
    }

    /// Verify `token` as a token of `expected` kind.
    ///
    /// With a cache the session must still exist, and the payload and header
    /// returned are the ones currently stored for it.
    pub async fn verify(&self, token: &str, expected: TokenKind) -> DomainResult<VerifiedToken> {
        let verified = self.codec.verify(token, expected).map_err(|e| {
            tracing::warn!(kind = %expected, error = %e, "Rejected token");
            e
        })?;

        let Some(cache) = self.cache.as_deref() else {
            return Ok(verified);
        };

        let record = self.load_record(cache, &verified.sid).await?.ok_or_else(|| {
            tracing::warn!(
                subject = %verified.subject,
                sid = %verified.sid,
                "Token refers to a session that no longer exists"
            );
            TokenError::NotValidSession
        })?;

        if record.subject != verified.subject {
            tracing::warn!(
                subject = %verified.subject,
                sid = %verified.sid,
                "Session record belongs to another subject"
            );
            return Err(TokenError::NotValidSession.into());
        }

        Ok(VerifiedToken {
            subject: verified.subject,
            sid: verified.sid,
            header: record.header,
            payload: record.payload,
        })
    }

    /// Rotate a refresh token into a new pair carrying the current session data.
    ///
    /// The presented token stops verifying once this succeeds.
    pub async fn refresh_pair(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let verified = self.verify(refresh_token, TokenKind::Refresh).await?;
        self.rotate(&verified.subject, &verified.sid, verified.payload, verified.header)
            .await
    }

    /// Rotate the session of `token` into a new pair with replaced data
    pub async fn update_user_data(
        &self,
        token: &str,
        expected: TokenKind,
        payload: Option<ClaimMap>,
        header: Option<ClaimMap>,
    ) -> DomainResult<TokenPair> {
        let verified = self.verify(token, expected).await?;
        self.rotate(&verified.subject, &verified.sid, payload, header).await
    }

    /// Revoke the session of `token`.
    ///
    /// A token whose session is already gone is accepted silently, so
    /// deleting twice succeeds. Every other verification failure is returned.
    pub async fn delete_pair(&self, token: &str, expected: TokenKind) -> DomainResult<()> {
        let verified = match self.verify(token, expected).await {
            Ok(verified) => verified,
            Err(e) if e.as_token_error() == Some(&TokenError::NotValidSession) => {
                tracing::debug!("Session already removed");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let Some(cache) = self.cache.as_deref() else {
            return Ok(());
        };

        cache.delete(&self.session_key(&verified.sid)).await?;
        cache
            .list_remove(&self.index_key(&verified.subject), &verified.sid, 0)
            .await?;

        tracing::info!(
            subject = %verified.subject,
            sid = %verified.sid,
            event = "session_revoked",
            "Deleted token pair"
        );

        Ok(())
    }

    /// Revoke every session of the token's subject except the token's own.
    ///
    /// The token has to verify; a rotated or revoked token cannot clear
    /// anything.
    pub async fn clear_other_sessions(&self, token: &str, expected: TokenKind) -> DomainResult<()> {
        let verified = self.verify(token, expected).await?;

        let Some(cache) = self.cache.as_deref() else {
            return Ok(());
        };

        let index = self.index_key(&verified.subject);
        let mut cleared = 0;
        for sid in cache.list_all(&index).await? {
            if sid == verified.sid {
                continue;
            }
            cache.delete(&self.session_key(&sid)).await?;
            cache.list_remove(&index, &sid, 0).await?;
            cleared += 1;
        }

        tracing::info!(
            subject = %verified.subject,
            kept_sid = %verified.sid,
            cleared = cleared,
            "Cleared other sessions"
        );

        Ok(())
    }

    /// Live sessions of `subject`, most recent first.
    ///
    /// Index entries whose record has expired are pruned along the way.
    pub async fn list_sessions(&self, subject: &str) -> DomainResult<Vec<SessionRecord>> {
        let Some(cache) = self.cache.as_deref() else {
            return Ok(Vec::new());
        };

        let index = self.index_key(subject);
        let sids = cache.list_all(&index).await?;
        let mut sessions = Vec::with_capacity(sids.len());

        for sid in sids {
            match self.load_record(cache, &sid).await? {
                Some(record) => sessions.push(record),
                None => {
                    tracing::debug!(subject = subject, sid = %sid, "Pruning orphaned index entry");
                    cache.list_remove(&index, &sid, 0).await?;
                }
            }
        }

        Ok(sessions)
    }

    /// Revoke every session of `subject`, returning how many were live
    pub async fn revoke_all(&self, subject: &str) -> DomainResult<usize> {
        let Some(cache) = self.cache.as_deref() else {
            return Ok(0);
        };

        let revoked = self.drop_all_sessions(cache, subject).await?;

        tracing::info!(
            subject = subject,
            revoked = revoked,
            event = "sessions_revoked",
            "Revoked all sessions"
        );

        Ok(revoked)
    }

    /// Subject of a correctly signed token even when it has expired
    pub fn subject_lenient(&self, token: &str) -> Option<String> {
        self.codec.subject_lenient(token)
    }

    async fn rotate(
        &self,
        subject: &str,
        sid: &str,
        payload: Option<ClaimMap>,
        header: Option<ClaimMap>,
    ) -> DomainResult<TokenPair> {
        if let Some(cache) = self.cache.as_deref() {
            if !cache.delete(&self.session_key(sid)).await? {
                tracing::warn!(
                    subject = subject,
                    sid = sid,
                    "Session was rotated or revoked concurrently"
                );
                return Err(TokenError::NotValidSession.into());
            }
            cache.list_remove(&self.index_key(subject), sid, 0).await?;
        }

        tracing::info!(subject = subject, old_sid = sid, event = "session_rotated", "Rotating session");

        self.issue_pair(subject, payload, header).await
    }

    fn mint(
        &self,
        subject: &str,
        sid: &str,
        payload: Option<ClaimMap>,
        header: Option<ClaimMap>,
    ) -> Result<TokenPair, TokenError> {
        let access_ttl = self.codec.ttl_for(TokenKind::Access);
        let refresh_ttl = self.codec.ttl_for(TokenKind::Refresh);

        let access_token = self.codec.encode(
            subject,
            TokenKind::Access,
            payload.clone(),
            header.clone(),
            Some(access_ttl),
            sid,
        )?;
        let refresh_token =
            self.codec
                .encode(subject, TokenKind::Refresh, payload, header, Some(refresh_ttl), sid)?;

        Ok(TokenPair::new(access_token, refresh_token, access_ttl, refresh_ttl))
    }

    /// Delete every record listed in the subject's index, then the index
    async fn drop_all_sessions(&self, cache: &dyn CacheEngine, subject: &str) -> DomainResult<usize> {
        let index = self.index_key(subject);
        let mut removed = 0;
        for sid in cache.list_all(&index).await? {
            if cache.delete(&self.session_key(&sid)).await? {
                removed += 1;
            }
        }
        cache.delete(&index).await?;
        Ok(removed)
    }

    async fn load_record(
        &self,
        cache: &dyn CacheEngine,
        sid: &str,
    ) -> DomainResult<Option<SessionRecord>> {
        match cache.get(&self.session_key(sid)).await? {
            Some(raw) => Ok(Some(SessionRecord::from_json(&raw)?)),
            None => Ok(None),
        }
    }

    fn session_key(&self, sid: &str) -> String {
        format!("{}:session:{}", self.config.key_prefix, sid)
    }

    fn index_key(&self, subject: &str) -> String {
        format!("{}:user_sessions:{}", self.config.key_prefix, subject)
    }
}

impl std::fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("codec", &self.codec)
            .field("cacheless", &self.cache.is_none())
            .field("config", &self.config)
            .finish()
    }
}
