//! Implementações de traits para os enums de erro do sistema
//!
//! Este módulo existe exclusivamente para desacoplar:
//! - definição de erros (enums)
//! - implementação de traits (`Display`, `Error`, `From`)
//!
//! Segue SRP, Extreme Programming e facilita manutenção/testes.

use std::error::Error as StdError;
use std::fmt;

use polars::prelude::PolarsError;

use crate::errors::{ApiError, TransformError};

/* ========================================================================== */
/* Display                                                                    */
/* ========================================================================== */

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::Io(err) => {
                write!(f, "[I/O] {}", err)
            }

            TransformError::Json(err) => {
                write!(f, "[JSON] {}", err)
            }

            TransformError::Parquet(err) => {
                write!(f, "[Parquet] {}", err)
            }

            TransformError::Schema(msg) => {
                write!(f, "[Schema] {}", msg)
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NetworkError(err) => {
                write!(f, "[Rede] {}", err)
            }

            ApiError::HttpStatusError { status, url } => {
                write!(f, "[HTTP {}] {}", status, url)
            }

            ApiError::FileSystemError(err) => {
                write!(f, "[Disco] {}", err)
            }

            ApiError::EmptyResponse => {
                write!(f, "[Rede] resposta vazia do servidor")
            }
        }
    }
}

/* ========================================================================== */
/* std::error::Error                                                          */
/* ========================================================================== */

impl StdError for TransformError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransformError::Io(err) => Some(err),
            TransformError::Json(err) => Some(err),
            TransformError::Parquet(_) => None,
            TransformError::Schema(_) => None,
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::NetworkError(err) => Some(err),
            ApiError::FileSystemError(err) => Some(err),
            ApiError::HttpStatusError { .. } | ApiError::EmptyResponse => None,
        }
    }
}

/* ========================================================================== */
/* Conversions                                                                */
/* ========================================================================== */

impl From<std::io::Error> for TransformError {
    fn from(err: std::io::Error) -> Self {
        TransformError::Io(err)
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        TransformError::Json(err)
    }
}

impl From<PolarsError> for TransformError {
    fn from(err: PolarsError) -> Self {
        TransformError::Parquet(err.to_string())
    }
}
