/// Collector module
///
/// This module groups all logic responsible for:
/// - Decoding a page body into the typed page model
/// - Suppressing the boundary duplicate between adjacent pages
/// - Driving the request/decode/filter/emit loop
///
/// The collector layer sits between:
/// - The transport (wire in/out)
/// - The record sink (translated output)
///
/// Design notes:
/// - Wire specifics MUST NOT leak past the decoder
/// - The walker owns termination and error propagation, nothing else
pub mod decoder;
pub mod dedup;
pub mod walker;
