//! Strict resolution of references against the catalog.
//!
//! Parsing and binary decoding leave references unresolved. This pass
//! checks that every reference in a value resolves, and that actual
//! parameters fit their formals (with trailing formals covered by
//! declared defaults).

use super::{Catalog, LookupError};
use crate::ari::{Ari, Reference};
use crate::types::{TypeChecker, TypeError};
use core::fmt;

/// A strict-resolution failure.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolveError {
    /// A reference did not resolve.
    Lookup {
        /// The underlying lookup failure.
        error: LookupError,
        /// Text form of the failing reference.
        reference: String,
    },
    /// An actual parameter failed its formal's type.
    Param {
        /// Parameter position.
        position: usize,
        /// The underlying type failure.
        error: TypeError,
    },
    /// The undefined value appeared as an actual parameter.
    UndefinedParam {
        /// Parameter position.
        position: usize,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup { error, reference } => write!(f, "{error}: {reference}"),
            Self::Param { position, error } => {
                write!(f, "parameter {position}: {error}")
            }
            Self::UndefinedParam { position } => {
                write!(f, "parameter {position} is undefined")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

impl Catalog {
    /// Check that every reference in a value resolves and is well-typed.
    ///
    /// # Errors
    ///
    /// The first [`ResolveError`] encountered, in traversal order.
    pub fn check_ari(&self, ari: &Ari) -> Result<(), ResolveError> {
        match ari {
            Ari::Literal(lit) => {
                let mut result = Ok(());
                lit.value.visit(&mut |sub| {
                    if result.is_ok() {
                        if let Ari::Reference(re) = sub {
                            result = self.check_reference(re);
                        }
                    }
                });
                result
            }
            Ari::Reference(re) => {
                self.check_reference(re)?;
                if let Some(params) = &re.params {
                    for param in params {
                        self.check_ari(param)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn check_reference(&self, re: &Reference) -> Result<(), ResolveError> {
        let (_, obj) = self.resolve_ident(&re.ident).map_err(|error| {
            ResolveError::Lookup {
                error,
                reference: Ari::Reference(Box::new(re.clone())).to_string(),
            }
        })?;

        let Some(actuals) = &re.params else {
            return Ok(());
        };
        if actuals.len() > obj.parameters.len() {
            return Err(ResolveError::Param {
                position: obj.parameters.len(),
                error: TypeError::TooManyParams {
                    formal: obj.parameters.len(),
                    actual: actuals.len(),
                },
            });
        }
        let checker = TypeChecker::new(self);
        for (position, (actual, formal)) in
            actuals.iter().zip(&obj.parameters).enumerate()
        {
            if actual.is_undefined() {
                return Err(ResolveError::UndefinedParam { position });
            }
            checker
                .convert(&formal.typeobj, actual)
                .map_err(|error| ResolveError::Param { position, error })?;
        }
        Ok(())
    }
}
