use rocket::{http::Status, response::status::Custom, response::Responder};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A rejected state transition of the voting state machine.
///
/// The message text of every variant is part of the external contract:
/// clients pattern-match on it, so it must never change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("Election not found.")]
    ElectionNotFound,
    #[error("Election has not started or has already been finished.")]
    ElectionNotActive,
    #[error("Candidate already exists. Reverting call.")]
    DuplicateCandidate,
    #[error("User has already voted. Reverting call.")]
    DuplicateVote,
    #[error("Candidate not found. Reverting call.")]
    CandidateNotFound,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] mongodb::error::Error),
    #[error(transparent)]
    Bson(#[from] mongodb::bson::ser::Error),
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Vote(#[from] VoteError),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> Status {
        match self {
            Self::Db(_) | Self::Bson(_) => Status::InternalServerError,
            Self::Jwt(_) | Self::Unauthorized(_) => Status::Unauthorized,
            Self::Status(status, _) => *status,
            Self::Vote(err) => match err {
                VoteError::ElectionNotFound | VoteError::CandidateNotFound => Status::NotFound,
                VoteError::ElectionNotActive => Status::UnprocessableEntity,
                VoteError::DuplicateCandidate | VoteError::DuplicateVote => Status::Conflict,
            },
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        match status.class() {
            rocket::http::StatusClass::ServerError => error!("{self}"),
            _ => warn!("{self}"),
        }
        // Rejection messages go in the body verbatim; see `VoteError`.
        Custom(status, self.to_string()).respond_to(req)
    }
}
