// Copyright @yucwang 2026

pub mod radiosity;
pub mod transport;
