//! Incremental decoding of the product list.
//!
//! The product service answers a list request with one JSON array. Rather
//! than buffering the whole body, [`ArrayDecoder`] splits the array into its
//! top-level elements as chunks arrive, and [`product_stream`] turns each
//! element into a [`Product`] as soon as it is complete.

use std::collections::VecDeque;

use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use thiserror::Error;

use crate::downstream::error::{ClientError, ClientResult};
use crate::products::Product;

/// Structural problems in a product list body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    #[error("expected '[' at start of product list")]
    MissingOpen,
    #[error("empty element in product list")]
    EmptyElement,
    #[error("unexpected data after end of product list")]
    TrailingData,
    #[error("product list ended before closing ']'")]
    Unterminated,
}

/// Splits a JSON array into raw element bytes across arbitrary chunk boundaries.
///
/// Only the array structure is tracked (nesting depth and string state);
/// element contents are validated later by `serde_json`.
#[derive(Debug, Default)]
pub struct ArrayDecoder {
    current: Vec<u8>,
    depth: usize,
    opened: bool,
    closed: bool,
    in_string: bool,
    escaped: bool,
    after_comma: bool,
}

impl ArrayDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk, returning every element completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Vec<u8>>, FramingError> {
        let mut elements = Vec::new();

        for &byte in chunk {
            if self.closed {
                if !byte.is_ascii_whitespace() {
                    return Err(FramingError::TrailingData);
                }
                continue;
            }

            if !self.opened {
                match byte {
                    b'[' => self.opened = true,
                    b if b.is_ascii_whitespace() => {}
                    _ => return Err(FramingError::MissingOpen),
                }
                continue;
            }

            if self.in_string {
                self.current.push(byte);
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }

            match byte {
                b'"' => {
                    self.in_string = true;
                    self.current.push(byte);
                }
                b'{' | b'[' => {
                    self.depth += 1;
                    self.current.push(byte);
                }
                b'}' | b']' if self.depth > 0 => {
                    self.depth -= 1;
                    self.current.push(byte);
                }
                b']' => {
                    if self.current.is_empty() {
                        if self.after_comma {
                            return Err(FramingError::EmptyElement);
                        }
                    } else {
                        elements.push(std::mem::take(&mut self.current));
                    }
                    self.closed = true;
                }
                b',' if self.depth == 0 => {
                    if self.current.is_empty() {
                        return Err(FramingError::EmptyElement);
                    }
                    elements.push(std::mem::take(&mut self.current));
                    self.after_comma = true;
                }
                b if b.is_ascii_whitespace() && self.depth == 0 && self.current.is_empty() => {}
                _ => self.current.push(byte),
            }
        }

        Ok(elements)
    }

    /// Signal end of body.
    ///
    /// An empty body counts as an empty list.
    pub fn finish(&self) -> Result<(), FramingError> {
        if self.opened && !self.closed {
            return Err(FramingError::Unterminated);
        }
        Ok(())
    }
}

/// Lazily decoded products, in downstream order.
pub type ProductStream = BoxStream<'static, ClientResult<Product>>;

struct ListState<S> {
    body: S,
    decoder: ArrayDecoder,
    ready: VecDeque<Vec<u8>>,
    done: bool,
}

/// Decode a streamed JSON array body into products.
///
/// The stream ends when the body ends. The first error ends it early.
pub fn product_stream<S, B, E>(body: S) -> ProductStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Send + 'static,
    ClientError: From<E>,
{
    let state = ListState {
        body: Box::pin(body),
        decoder: ArrayDecoder::new(),
        ready: VecDeque::new(),
        done: false,
    };

    stream::try_unfold(state, next_product).boxed()
}

async fn next_product<S, B, E>(
    mut state: ListState<S>,
) -> ClientResult<Option<(Product, ListState<S>)>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    ClientError: From<E>,
{
    loop {
        if let Some(raw) = state.ready.pop_front() {
            let product = serde_json::from_slice::<Product>(&raw)?;
            return Ok(Some((product, state)));
        }
        if state.done {
            return Ok(None);
        }
        match state.body.next().await {
            Some(chunk) => {
                let chunk = chunk?;
                let elements = state.decoder.push(chunk.as_ref())?;
                state.ready.extend(elements);
            }
            None => {
                state.decoder.finish()?;
                state.done = true;
            }
        }
    }
}
