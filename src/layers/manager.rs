use crate::{
    core::constants::{DEFAULT_SELECTION_DELTA, FIRST_LAYER_ID},
    layers::{
        base::{Layer, LayerId, LayerOptions},
        entity::LayerEntities,
    },
    prelude::HashMap,
    MapError, Result,
};
use std::collections::BTreeSet;

/// Owns every layer and the order they are drawn and hit-tested in.
///
/// Mutators return `true` when the change can alter what is drawn, so the
/// caller knows to request a redraw. Unknown IDs are ignored.
pub struct LayerRegistry {
    /// All layers indexed by ID
    layers: HashMap<LayerId, Layer>,
    /// Bottom-most first; later entries draw on top
    z_order: Vec<LayerId>,
    next_id: u32,
    levels: (u8, u8),
    default_delta: f64,
}

impl LayerRegistry {
    /// Registry for a map whose allowed levels are `min_level..=max_level`
    pub fn new(min_level: u8, max_level: u8) -> Self {
        Self {
            layers: HashMap::default(),
            z_order: Vec::new(),
            next_id: FIRST_LAYER_ID,
            levels: (min_level, max_level),
            default_delta: DEFAULT_SELECTION_DELTA,
        }
    }

    /// Selection delta given to layers that do not set their own
    pub fn with_default_delta(mut self, delta: f64) -> Self {
        self.default_delta = delta;
        self
    }

    /// Validates and registers a layer on top of the Z-order.
    ///
    /// Nothing is registered when validation fails.
    pub fn add(&mut self, entities: LayerEntities, mut options: LayerOptions) -> Result<LayerId> {
        entities.validate()?;
        if let Some(delta) = options.selection_delta.filter(|d| !valid_delta(*d)) {
            return Err(MapError::InvalidLayerData(format!(
                "selection delta must be a non-negative number, got {}",
                delta
            )));
        }

        let id = LayerId(self.next_id);
        self.next_id += 1;
        options.selection_delta.get_or_insert(self.default_delta);

        let layer = Layer::new(id, entities, options, self.levels);
        log::debug!(
            "added {} layer {} '{}' with {} entities",
            layer.kind(),
            id,
            layer.name,
            layer.entities.len()
        );

        self.layers.insert(id, layer);
        self.z_order.push(id);
        Ok(id)
    }

    /// Removes a layer, returning it if it existed
    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let layer = self.layers.remove(&id)?;
        self.z_order.retain(|other| *other != id);
        log::debug!("deleted layer {} '{}'", id, layer.name);
        Some(layer)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Shows or hides a layer
    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> bool {
        match self.layers.get_mut(&id) {
            Some(layer) if layer.visible != visible => {
                layer.visible = visible;
                true
            }
            _ => false,
        }
    }

    /// Selectability never changes the picture, so this never asks for a redraw
    pub fn set_selectable(&mut self, id: LayerId, selectable: bool) -> bool {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.selectable = selectable;
        }
        false
    }

    /// Replaces the levels a layer shows at; `None` restores the full range
    pub fn set_show_levels(&mut self, id: LayerId, levels: Option<BTreeSet<u8>>) -> bool {
        let (min_level, max_level) = self.levels;
        let levels = levels.unwrap_or_else(|| (min_level..=max_level).collect());
        match self.layers.get_mut(&id) {
            Some(layer) => {
                layer.show_levels = levels;
                layer.visible
            }
            None => false,
        }
    }

    /// Negative and non-finite deltas are ignored
    pub fn set_selection_delta(&mut self, id: LayerId, delta: f64) -> bool {
        match self.layers.get_mut(&id) {
            Some(layer) if valid_delta(delta) => layer.selection_delta = delta,
            Some(_) => log::warn!("ignoring selection delta {} for layer {}", delta, id),
            None => {}
        }
        false
    }

    // Z-order

    /// Moves a layer to the bottom of the Z-order
    pub fn push_to_back(&mut self, id: LayerId) -> bool {
        if !self.detach(id) {
            return false;
        }
        self.z_order.insert(0, id);
        log::trace!("layer {} pushed to back", id);
        self.is_visible(id)
    }

    /// Moves a layer to the top of the Z-order
    pub fn pop_to_front(&mut self, id: LayerId) -> bool {
        if !self.detach(id) {
            return false;
        }
        self.z_order.push(id);
        log::trace!("layer {} popped to front", id);
        self.is_visible(id)
    }

    /// Moves `id` to sit directly below `reference`
    pub fn place_below(&mut self, id: LayerId, reference: LayerId) -> bool {
        if id == reference || !self.contains(reference) || !self.detach(id) {
            return false;
        }
        let position = self
            .z_order
            .iter()
            .position(|other| *other == reference)
            .unwrap_or(0);
        self.z_order.insert(position, id);
        log::trace!("layer {} placed below {}", id, reference);
        self.is_visible(id)
    }

    fn detach(&mut self, id: LayerId) -> bool {
        match self.z_order.iter().position(|other| *other == id) {
            Some(position) => {
                self.z_order.remove(position);
                true
            }
            None => false,
        }
    }

    fn is_visible(&self, id: LayerId) -> bool {
        self.layers.get(&id).map(|l| l.visible).unwrap_or(false)
    }

    /// Copy of the Z-order, bottom-most first, safe to iterate while mutating
    pub fn z_order_snapshot(&self) -> Vec<LayerId> {
        self.z_order.clone()
    }

    /// Layers bottom-most first
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.z_order.iter().filter_map(|id| self.layers.get(id))
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

fn valid_delta(delta: f64) -> bool {
    delta.is_finite() && delta >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::entity::PointEntity;

    fn points() -> LayerEntities {
        LayerEntities::Point(vec![PointEntity::new(0.0, 0.0)])
    }

    fn registry_with(n: usize) -> (LayerRegistry, Vec<LayerId>) {
        let mut registry = LayerRegistry::new(0, 5);
        let ids = (0..n)
            .map(|_| registry.add(points(), LayerOptions::new()).unwrap())
            .collect();
        (registry, ids)
    }

    #[test]
    fn test_bad_selection_delta() {
        let mut registry = LayerRegistry::new(0, 5);
        for delta in [-1.0, f64::NAN, f64::INFINITY] {
            let result = registry.add(points(), LayerOptions::new().with_selection_delta(delta));
            assert!(matches!(result, Err(MapError::InvalidLayerData(_))));
        }
        assert!(registry.is_empty());

        let id = registry.add(points(), LayerOptions::new()).unwrap();
        registry.set_selection_delta(id, -2.0);
        registry.set_selection_delta(id, f64::NAN);
        assert_eq!(registry.get(id).unwrap().selection_delta, 5.0);
        registry.set_selection_delta(id, 0.0);
        assert_eq!(registry.get(id).unwrap().selection_delta, 0.0);
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let (mut registry, ids) = registry_with(3);
        assert_eq!(ids, vec![LayerId(1), LayerId(2), LayerId(3)]);
        registry.remove(LayerId(3));
        let next = registry.add(points(), LayerOptions::new()).unwrap();
        assert_eq!(next, LayerId(4));
    }

    #[test]
    fn test_invalid_data_registers_nothing() {
        let mut registry = LayerRegistry::new(0, 5);
        let bad = LayerEntities::Point(vec![PointEntity::new(f64::INFINITY, 0.0)]);
        assert!(registry.add(bad, LayerOptions::new()).is_err());
        assert!(registry.is_empty());
        assert!(registry.z_order_snapshot().is_empty());
        assert_eq!(registry.add(points(), LayerOptions::new()).unwrap(), LayerId(1));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let (mut registry, _) = registry_with(2);
        assert!(registry.remove(LayerId(0)).is_none());
        assert!(registry.remove(LayerId(99)).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_push_then_pop_keeps_single_entry() {
        let (mut registry, ids) = registry_with(4);
        registry.push_to_back(ids[2]);
        assert_eq!(registry.z_order_snapshot(), vec![ids[2], ids[0], ids[1], ids[3]]);
        registry.pop_to_front(ids[2]);
        let order = registry.z_order_snapshot();
        assert_eq!(order, vec![ids[0], ids[1], ids[3], ids[2]]);
        assert_eq!(order.iter().filter(|id| **id == ids[2]).count(), 1);
    }

    #[test]
    fn test_place_below() {
        let (mut registry, ids) = registry_with(4);
        assert!(registry.place_below(ids[3], ids[1]));
        assert_eq!(registry.z_order_snapshot(), vec![ids[0], ids[3], ids[1], ids[2]]);

        assert!(registry.place_below(ids[0], ids[2]));
        assert_eq!(registry.z_order_snapshot(), vec![ids[3], ids[1], ids[0], ids[2]]);
    }

    #[test]
    fn test_place_below_self_or_missing_is_stable() {
        let (mut registry, ids) = registry_with(3);
        let before = registry.z_order_snapshot();
        assert!(!registry.place_below(ids[1], ids[1]));
        assert!(!registry.place_below(ids[1], LayerId(42)));
        assert!(!registry.place_below(LayerId(42), ids[1]));
        assert_eq!(registry.z_order_snapshot(), before);
    }

    #[test]
    fn test_redraw_flags() {
        let (mut registry, ids) = registry_with(1);
        assert!(!registry.set_visible(ids[0], true));
        assert!(registry.set_visible(ids[0], false));
        assert!(!registry.set_show_levels(ids[0], Some([1].into_iter().collect())));
        assert!(registry.set_visible(ids[0], true));
        assert!(registry.set_show_levels(ids[0], None));
        assert_eq!(registry.get(ids[0]).unwrap().show_levels.len(), 6);
        assert!(!registry.set_selectable(ids[0], true));
        assert!(registry.get(ids[0]).unwrap().selectable);
        assert!(!registry.set_visible(LayerId(9), false));
    }

    #[test]
    fn test_default_delta() {
        let mut registry = LayerRegistry::new(0, 5).with_default_delta(9.0);
        let plain = registry.add(points(), LayerOptions::new()).unwrap();
        let own = registry
            .add(points(), LayerOptions::new().with_selection_delta(2.0))
            .unwrap();
        assert_eq!(registry.get(plain).unwrap().selection_delta, 9.0);
        assert_eq!(registry.get(own).unwrap().selection_delta, 2.0);
        registry.set_selection_delta(own, 4.0);
        assert_eq!(registry.get(own).unwrap().selection_delta, 4.0);
    }
}
