//! The session RPC contract as a trait.
//!
//! The gateway only talks to `dyn SessionService`; it never knows whether
//! the manager lives in the same process or behind the JSON RPC server.

use async_trait::async_trait;

use tg_domain::error::Result;

use crate::manager::SessionManager;
use crate::protocol::{
    CreateSessionRequest, CreateSessionResponse, DestroySessionRequest, DestroySessionResponse,
    VerifySessionRequest, VerifySessionResponse,
};

#[async_trait]
pub trait SessionService: Send + Sync {
    /// `Err` is `InvalidArgument` for caller mistakes; anything else is a
    /// retryable service fault.
    async fn create_session(&self, req: CreateSessionRequest) -> Result<CreateSessionResponse>;

    /// `Err` means the verdict is unknown (transport failure); callers must
    /// treat that as not verified.
    async fn verify_session(&self, req: VerifySessionRequest) -> Result<VerifySessionResponse>;

    async fn destroy_session(&self, req: DestroySessionRequest) -> Result<DestroySessionResponse>;
}

#[async_trait]
impl SessionService for SessionManager {
    async fn create_session(&self, req: CreateSessionRequest) -> Result<CreateSessionResponse> {
        let session_token = SessionManager::create_session(
            self,
            &req.primary_token,
            &req.secondary_token,
            &req.refresh_token,
        )?;
        Ok(CreateSessionResponse { session_token })
    }

    async fn verify_session(&self, req: VerifySessionRequest) -> Result<VerifySessionResponse> {
        Ok(SessionManager::verify_session(self, &req.session_token).into())
    }

    async fn destroy_session(&self, req: DestroySessionRequest) -> Result<DestroySessionResponse> {
        self.destroy_session_by_token(&req.session_token);
        Ok(DestroySessionResponse {})
    }
}
