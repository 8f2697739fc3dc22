//! Conversion of raw dataset handles into the form a model evaluates on.

use crate::error::MlError;
use std::marker::PhantomData;

/// Converts a raw dataset representation into an evaluable one.
pub trait DatasetAdapter<R> {
    type Output;

    fn adapt(&self, raw: R) -> Result<Self::Output, MlError>;
}

/// Hands the dataset through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Passthrough<R>(PhantomData<fn(R) -> R>);

impl<R> Passthrough<R> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R> Default for Passthrough<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> DatasetAdapter<R> for Passthrough<R> {
    type Output = R;

    fn adapt(&self, raw: R) -> Result<R, MlError> {
        Ok(raw)
    }
}

/// Wraps a conversion closure.
pub struct FnAdapter<F>(pub F);

impl<R, T, F> DatasetAdapter<R> for FnAdapter<F>
where
    F: Fn(R) -> Result<T, MlError>,
{
    type Output = T;

    fn adapt(&self, raw: R) -> Result<T, MlError> {
        (self.0)(raw)
    }
}
