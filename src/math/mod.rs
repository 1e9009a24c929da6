// Copyright 2020 @TwoCookingMice

pub mod aabb;
pub mod constants;
pub mod frame;
pub mod numeric;
pub mod ray;
pub mod warp;
