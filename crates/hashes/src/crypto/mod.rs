//! KangarooTwelve and the TurboSHAKE sponge it is built on.

pub mod kangaroo;
mod keccak;
pub mod turboshake;

pub use kangaroo::{KtError, KtReader, Kt128, Kt256, Phase};
pub use turboshake::{InvalidDomainSeparation, Security, TurboShake128, TurboShake128Xof, TurboShake256, TurboShake256Xof};
