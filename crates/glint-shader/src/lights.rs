//! Scene light packing for uniform upload
//!
//! Follows the one-main-directional-light-plus-packed-array model: the
//! main light gets dedicated uniforms while every other light lands in
//! fixed-capacity flat arrays, indexed by insertion order. All light
//! fields share a homogeneous vec4 layout so the four arrays pack with a
//! single stride.

use glam::{Vec3, Vec4};

/// Default capacity for the packed additional-light arrays
pub const MAX_ADDITIONAL_LIGHTS: usize = 16;

/// GPU-facing record for one light
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightRecord {
    pub position: Vec4,
    pub direction: Vec4,
    pub color: Vec4,
    pub attenuation: Vec4,
}

/// All lighting state for a frame: an optional main directional light, a
/// keyed collection of additional lights, and one ambient color.
///
/// Additional lights keep insertion order, which determines their packing
/// slot; re-setting an existing key updates the record in place without
/// moving it.
#[derive(Debug, Clone, Default)]
pub struct LightData {
    pub main_light: Option<LightRecord>,
    pub ambient_color: Vec3,
    additional: Vec<(u64, LightRecord)>,
}

impl LightData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update the additional light identified by `key`
    pub fn set_additional_light(&mut self, key: u64, light: LightRecord) {
        match self.additional.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = light,
            None => self.additional.push((key, light)),
        }
    }

    /// Remove an additional light; later lights shift down a slot
    pub fn remove_additional_light(&mut self, key: u64) -> Option<LightRecord> {
        let index = self.additional.iter().position(|(k, _)| *k == key)?;
        Some(self.additional.remove(index).1)
    }

    pub fn additional_lights(&self) -> impl Iterator<Item = &LightRecord> {
        self.additional.iter().map(|(_, light)| light)
    }

    pub fn additional_count(&self) -> usize {
        self.additional.len()
    }
}

/// Additional lights flattened into four parallel `4 * capacity` float
/// arrays, ready for vec4-array uniform upload. Unused slots stay zeroed.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedLights {
    pub positions: Vec<f32>,
    pub directions: Vec<f32>,
    pub colors: Vec<f32>,
    pub attenuations: Vec<f32>,
    /// Number of slots actually populated
    pub count: usize,
}

impl PackedLights {
    /// Pack the additional lights of `data` into `capacity` slots.
    ///
    /// Overflow policy: hard truncation. The first `capacity` lights in
    /// insertion order are kept, the excess is dropped, and `count` is
    /// clamped to `capacity`.
    pub fn pack(data: &LightData, capacity: usize) -> Self {
        let mut packed = Self {
            positions: vec![0.0; capacity * 4],
            directions: vec![0.0; capacity * 4],
            colors: vec![0.0; capacity * 4],
            attenuations: vec![0.0; capacity * 4],
            count: data.additional_count().min(capacity),
        };

        for (slot, light) in data.additional_lights().take(capacity).enumerate() {
            write_vec4(&mut packed.positions, slot, light.position);
            write_vec4(&mut packed.directions, slot, light.direction);
            write_vec4(&mut packed.colors, slot, light.color);
            write_vec4(&mut packed.attenuations, slot, light.attenuation);
        }

        packed
    }
}

fn write_vec4(buf: &mut [f32], slot: usize, v: Vec4) {
    buf[slot * 4..slot * 4 + 4].copy_from_slice(&v.to_array());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(seed: f32) -> LightRecord {
        LightRecord {
            position: Vec4::new(seed, seed + 0.1, seed + 0.2, 1.0),
            direction: Vec4::new(0.0, -1.0, 0.0, 0.0),
            color: Vec4::new(seed, seed, seed, 1.0),
            attenuation: Vec4::new(1.0, 0.09, 0.032, seed),
        }
    }

    fn slot(buf: &[f32], i: usize) -> [f32; 4] {
        [buf[i * 4], buf[i * 4 + 1], buf[i * 4 + 2], buf[i * 4 + 3]]
    }

    #[test]
    fn packs_lights_into_slots_by_insertion_order() {
        let mut data = LightData::new();
        for i in 0..3u64 {
            data.set_additional_light(i, light(i as f32));
        }

        let packed = PackedLights::pack(&data, MAX_ADDITIONAL_LIGHTS);
        assert_eq!(packed.count, 3);
        assert_eq!(packed.positions.len(), MAX_ADDITIONAL_LIGHTS * 4);

        for i in 0..3 {
            assert_eq!(slot(&packed.positions, i), light(i as f32).position.to_array());
            assert_eq!(slot(&packed.colors, i), light(i as f32).color.to_array());
            assert_eq!(
                slot(&packed.attenuations, i),
                light(i as f32).attenuation.to_array()
            );
        }
        // Unused slots are zero-filled
        for i in 3..MAX_ADDITIONAL_LIGHTS {
            assert_eq!(slot(&packed.positions, i), [0.0; 4]);
            assert_eq!(slot(&packed.colors, i), [0.0; 4]);
        }
    }

    #[test]
    fn overflow_truncates_deterministically() {
        let mut data = LightData::new();
        for i in 0..20u64 {
            data.set_additional_light(i, light(i as f32));
        }

        let packed = PackedLights::pack(&data, MAX_ADDITIONAL_LIGHTS);
        assert_eq!(packed.count, MAX_ADDITIONAL_LIGHTS);
        // The first 16 in insertion order survive; slot 15 is light 15
        assert_eq!(slot(&packed.positions, 15), light(15.0).position.to_array());
    }

    #[test]
    fn resetting_a_key_keeps_its_slot() {
        let mut data = LightData::new();
        data.set_additional_light(7, light(0.0));
        data.set_additional_light(9, light(1.0));
        data.set_additional_light(7, light(2.0));

        let packed = PackedLights::pack(&data, 4);
        assert_eq!(packed.count, 2);
        assert_eq!(slot(&packed.positions, 0), light(2.0).position.to_array());
        assert_eq!(slot(&packed.positions, 1), light(1.0).position.to_array());
    }

    #[test]
    fn removing_a_light_shifts_later_slots_down() {
        let mut data = LightData::new();
        data.set_additional_light(1, light(0.0));
        data.set_additional_light(2, light(1.0));
        data.set_additional_light(3, light(2.0));

        assert!(data.remove_additional_light(2).is_some());
        assert!(data.remove_additional_light(2).is_none());

        let packed = PackedLights::pack(&data, 4);
        assert_eq!(packed.count, 2);
        assert_eq!(slot(&packed.positions, 1), light(2.0).position.to_array());
    }
}
