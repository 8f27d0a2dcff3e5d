//! Finder contract
//!
//! A finder reads one remote object by identifier and is the only layer
//! that translates service-specific "does not exist" codes into the
//! [`FinderError::NotFound`] sentinel. Every Read path goes through a finder
//! so the "drop from state" policy stays uniform across resources.
//!
//! Finders that scan list APIs must follow pagination tokens to exhaustion
//! before concluding NotFound.

use crate::error::ApiError;
use thiserror::Error;

/// Outcome of a failed find: either the sentinel or a transport failure
#[derive(Error, Debug)]
pub enum FinderError {
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FinderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

pub type FindResult<T> = Result<T, FinderError>;

/// Collapse NotFound into `Ok(None)`, keeping transport failures
///
/// Delete paths use this: a resource already gone is a successful delete.
pub fn not_found_ok<T>(result: FindResult<T>) -> Result<Option<T>, ApiError> {
    match result {
        Ok(object) => Ok(Some(object)),
        Err(FinderError::NotFound) => Ok(None),
        Err(FinderError::Api(err)) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_ok() {
        assert_eq!(not_found_ok::<u32>(Ok(7)).unwrap(), Some(7));
        assert_eq!(not_found_ok::<u32>(Err(FinderError::NotFound)).unwrap(), None);

        let err = ApiError::new("InternalError", "boom");
        let result = not_found_ok::<u32>(Err(FinderError::Api(err.clone())));
        assert_eq!(result.unwrap_err(), err);
    }
}
