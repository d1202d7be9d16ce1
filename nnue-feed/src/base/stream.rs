//! Upstream position stream.
use crate::{stream::StreamConfig, PositionGroup};
use anyhow::Result;

/// A source of decoded position groups, typically a reader over record files.
///
/// The record format is owned by the implementation. A stream is used for a
/// single pass and is replaced by a freshly opened one after it reports
/// exhaustion.
pub trait PositionStream {
    /// Returns the next group, or `None` once the stream is exhausted.
    fn next_group(&mut self) -> Result<Option<PositionGroup>>;
}

impl<S: PositionStream + ?Sized> PositionStream for Box<S> {
    fn next_group(&mut self) -> Result<Option<PositionGroup>> {
        (**self).next_group()
    }
}

/// Opens [`PositionStream`]s over the inputs described by a [`StreamConfig`].
///
/// Any `FnMut(&StreamConfig) -> Result<S>` is an opener.
pub trait StreamOpener {
    /// Stream produced by this opener.
    type Stream: PositionStream;

    /// Opens a new stream positioned at the beginning of the inputs.
    fn open(&mut self, config: &StreamConfig) -> Result<Self::Stream>;
}

impl<F, S> StreamOpener for F
where
    F: FnMut(&StreamConfig) -> Result<S>,
    S: PositionStream,
{
    type Stream = S;

    fn open(&mut self, config: &StreamConfig) -> Result<S> {
        self(config)
    }
}
