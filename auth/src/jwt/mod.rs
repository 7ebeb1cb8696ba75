pub mod claims;
pub mod codec;
pub mod errors;

pub use claims::Claims;
pub use codec::TokenCodec;
pub use codec::TokenKind;
pub use codec::TokenSettings;
pub use errors::JwtError;
