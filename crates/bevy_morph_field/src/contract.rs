//! Host-side mirror of the per-particle program in `morph_field.wgsl`.
//!
//! The GPU evaluates these formulas for every particle each frame. Keep the
//! two in sync: a renderer without the shader can iterate these functions
//! over the field buffers instead, at O(particle count) host cost.

use bevy::prelude::*;

/// Linear blend between the two endpoints.
pub fn morph(scatter: Vec3, assembled: Vec3, progress: f32) -> Vec3 {
    scatter.lerp(assembled, progress)
}

/// Foliage position: morph, wind sway once formed, float while scattered.
pub fn foliage_position(
    scatter: Vec3,
    assembled: Vec3,
    random: f32,
    time: f32,
    progress: f32,
) -> Vec3 {
    let mut pos = morph(scatter, assembled, progress);

    let wind = (time * 2.0 + pos.y * 0.5).sin() * 0.1 * progress;
    pos.x += wind;
    pos.z += wind * 0.5;

    pos.y += (time + random * 10.0).sin() * 0.5 * (1.0 - progress);
    pos
}

/// Quad edge length of a foliage particle.
pub fn foliage_size(random: f32, size_scale: f32) -> f32 {
    (6.0 + random * 5.0) * size_scale
}

/// Glint alpha, in `[0.4, 1.0]`.
pub fn foliage_alpha(random: f32, time: f32) -> f32 {
    0.7 + 0.3 * (time * 3.0 + random * 100.0).sin()
}

/// 1.0 where the accent color replaces the base color.
pub fn accent_mix(random: f32, threshold: f32) -> f32 {
    if random >= threshold { 1.0 } else { 0.0 }
}

/// Twinkle position: morph plus radial breathing once formed.
pub fn twinkle_position(scatter: Vec3, assembled: Vec3, time: f32, progress: f32) -> Vec3 {
    let pos = morph(scatter, assembled, progress);
    let breath = (time * 1.5 + pos.y).sin() * 0.05 * progress;
    pos + pos.normalize_or_zero() * breath
}

/// Quad edge length of a twinkle light.
pub fn twinkle_size(size_scale: f32) -> f32 {
    15.0 * size_scale
}

/// `pow(0.5 + 0.5·sin(t·speed + phase), 3)`: a sharp, per-particle blink.
pub fn twinkle_blink(time: f32, speed: f32, phase: f32) -> f32 {
    let wave = 0.5 + 0.5 * (time * speed + phase).sin();
    wave * wave * wave
}

/// Radial falloff of a sprite; `distance` is 0 at the center, 0.5 at the rim.
pub fn glow(distance: f32, exponent: f32) -> f32 {
    if distance > 0.5 {
        return 0.0;
    }
    (1.0 - distance * 2.0).powf(exponent)
}
