// Copyright @yucwang 2021

pub mod bsp;
pub mod diffuser;
pub mod error;
pub mod interaction;
pub mod optics;
pub mod pattern;
pub mod primitive;
pub mod rng;
pub mod scene;
pub mod settings;
