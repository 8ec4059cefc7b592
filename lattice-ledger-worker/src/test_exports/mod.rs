// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Tooling to build self-consistent lattices in tests.

mod chain_builder;

pub use chain_builder::ChainBuilder;
