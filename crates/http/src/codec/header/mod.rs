mod header_decoder;
pub use header_decoder::HeaderDecoder;

mod header_encoder;
pub use header_encoder::HeaderEncoder;
