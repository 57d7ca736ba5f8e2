//! Prop placements: entities carrying a Transform and, optionally, the model
//! drawn there.

use crate::error::{CoreError, CoreResult};
use crate::transform::Transform;

/// Entity id, dense in spawn order.
pub type Entity = u32;

/// Index of a loaded model in the owner's model table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

/// Component: draw the referenced model at the entity's transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Renderable {
    pub model: ModelId,
}

#[derive(Debug, Default)]
pub struct World {
    transforms: Vec<Transform>,
    renderables: Vec<Option<Renderable>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, t: Transform, r: Option<Renderable>) -> Entity {
        let id = self.transforms.len() as Entity;
        self.transforms.push(t);
        self.renderables.push(r);
        id
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// (Transform, Renderable) pairs in spawn order.
    pub fn iter_renderables(&self) -> impl Iterator<Item = (&Transform, &Renderable)> {
        self.transforms
            .iter()
            .zip(&self.renderables)
            .filter_map(|(t, r)| r.as_ref().map(|r| (t, r)))
    }

    /// Every renderable must name a model below `model_count`.
    pub fn validate_models(&self, model_count: usize) -> CoreResult<()> {
        match self
            .iter_renderables()
            .find(|(_, r)| r.model.0 as usize >= model_count)
        {
            Some((_, r)) => Err(CoreError::UnknownModel(r.model.0)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    #[test]
    fn spawn_and_iterate_in_order() {
        let mut world = World::new();
        for i in 0..10 {
            let t = Transform::from_placement(Vec3::new(i as f32, 0.0, 0.0), 0.0, 1.0);
            world.spawn(t, Some(Renderable { model: ModelId(i % 2) }));
        }
        let marker = world.spawn(Transform::IDENTITY, None);

        assert_eq!(marker, 10);
        assert_eq!(world.len(), 11);
        assert_eq!(world.iter_renderables().count(), 10);
        let xs: Vec<f32> = world
            .iter_renderables()
            .map(|(t, _)| t.translation.x)
            .collect();
        assert_eq!(xs, (0..10).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn validate_rejects_dangling_model() {
        let mut world = World::new();
        world.spawn(Transform::IDENTITY, Some(Renderable { model: ModelId(3) }));
        assert_eq!(world.validate_models(2), Err(CoreError::UnknownModel(3)));
        assert!(world.validate_models(4).is_ok());
    }
}
