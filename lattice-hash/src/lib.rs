// Copyright (c) 2022 MASSA LABS <info@massa.net>

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]
//! 256-bit Blake2b digests used as block hashes, roots and vote hashes

pub use error::HashError;
pub use hash::{Hash, HashDeserializer, HashSerializer};
pub use settings::HASH_SIZE_BYTES;

mod error;
mod hash;
mod settings;
