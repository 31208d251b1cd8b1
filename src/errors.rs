//! Error taxonomy for a collection pass.
//!
//! All variants are fatal to the pass they occur in: the walker
//! propagates them immediately, no page is retried, and records
//! already forwarded for earlier pages stay forwarded.

use thiserror::Error;

/// Failure of one collection pass.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Network/IO failure sending a request or reading a page body
    #[error("transport failure")]
    Transport(#[source] anyhow::Error),

    /// Structurally malformed page body
    #[error("decode failure")]
    Decode(#[from] DecodeError),

    /// Server-reported non-ok result code for a page
    #[error("broker reported result {code:?}")]
    Protocol { code: String },

    /// The record sink went away mid-pass
    #[error("sink unavailable")]
    Sink(#[source] anyhow::Error),

    /// Cancellation flag observed before issuing the next request
    #[error("collection cancelled")]
    Cancelled,
}

/// Structural mismatch while decoding a page body.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed xml")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("page body is not valid utf-8")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("missing required element <{0}>")]
    MissingElement(&'static str),

    #[error("counter <{field}> is not numeric: {value:?}")]
    InvalidCounter { field: String, value: String },
}
