#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod claims;
mod codec;
mod error;
mod hasher;
mod issuer;
mod keys;

pub use crate::claims::{TokenClaims, TokenKind};
pub use crate::codec::TokenCodec;
pub use crate::error::{AuthError, AuthResult};
pub use crate::hasher::PasswordHasher;
pub use crate::issuer::{TokenIssuer, TokenPair};
pub use crate::keys::SigningKey;
