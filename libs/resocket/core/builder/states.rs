//! Type-state markers for the builder pattern
//!
//! These types track which required fields have been set in the
//! builder at compile-time, so `build()` only exists once both the
//! URL and the message callback are present.

use std::marker::PhantomData;

/// Marker trait for URL state
pub trait UrlState {}

/// URL has not been set
pub struct NoUrl;
impl UrlState for NoUrl {}

/// URL has been set
pub struct HasUrl;
impl UrlState for HasUrl {}

/// Marker trait for message callback state
pub trait HandlerState {}

/// Callback has not been set
pub struct NoHandler;
impl HandlerState for NoHandler {}

/// Callback has been set
pub struct HasHandler;
impl HandlerState for HasHandler {}

/// Phantom marker to prevent direct construction
#[derive(Debug, Clone, Copy)]
pub struct TypeState<U, H> {
    _url: PhantomData<U>,
    _handler: PhantomData<H>,
}

impl<U, H> TypeState<U, H> {
    pub(crate) fn new() -> Self {
        Self {
            _url: PhantomData,
            _handler: PhantomData,
        }
    }
}

impl<U, H> Default for TypeState<U, H> {
    fn default() -> Self {
        Self::new()
    }
}
