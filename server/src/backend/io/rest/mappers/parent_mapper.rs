use crate::backend::domain::models::parent::Parent;
use crate::backend::domain::session::SessionContext;
use shared::{ParentAccount, SessionResponse};

pub struct ParentMapper;

impl ParentMapper {
    /// Account view without credentials
    pub fn to_dto(domain: &Parent) -> ParentAccount {
        ParentAccount {
            id: domain.id.clone(),
            email: domain.email.clone(),
        }
    }

    pub fn session_to_account_dto(session: &SessionContext) -> ParentAccount {
        ParentAccount {
            id: session.parent_id.clone(),
            email: session.email.clone(),
        }
    }

    pub fn to_session_dto(session: SessionContext) -> SessionResponse {
        SessionResponse {
            parent: Self::session_to_account_dto(&session),
            expires_at: session.expires_at.to_rfc3339(),
            token: session.token,
        }
    }
}
