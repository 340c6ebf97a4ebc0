//! Closeout error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while recording a closeout.
#[derive(Debug, Error)]
pub enum CloseoutError {
    /// The request named no credits.
    #[error("Closeout request contains no credits")]
    EmptyRequest,

    /// Closeouts are reserved for designated clients.
    #[error("Client {0} is not designated for bulk closeout")]
    NotDesignatedClient(Uuid),

    /// A requested credit belongs to another client.
    #[error("Credit {credit_id} does not belong to client {client_id}")]
    ForeignCredit {
        /// The offending credit.
        credit_id: Uuid,
        /// The designated client of the closeout.
        client_id: Uuid,
    },

    /// A requested credit is not open or overdue.
    #[error("Credit {0} is not open")]
    CreditNotOpen(Uuid),

    /// A requested credit does not exist.
    #[error("Credit not found: {0}")]
    CreditNotFound(Uuid),
}

impl CloseoutError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyRequest => "EMPTY_REQUEST",
            Self::NotDesignatedClient(_) => "NOT_DESIGNATED_CLIENT",
            Self::ForeignCredit { .. } => "FOREIGN_CREDIT",
            Self::CreditNotOpen(_) => "CREDIT_NOT_OPEN",
            Self::CreditNotFound(_) => "CREDIT_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::EmptyRequest => 400,
            Self::NotDesignatedClient(_) | Self::ForeignCredit { .. } | Self::CreditNotOpen(_) => {
                422
            }
            Self::CreditNotFound(_) => 404,
        }
    }
}
