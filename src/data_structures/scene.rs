//! The scene graph: objects with transforms, parents and lights.
//!
//! Objects live in a slot arena and are addressed by [`ObjectId`]. An id
//! carries the generation of its slot, so a stale id of a removed object
//! never reaches whatever reused the slot.

use std::sync::Arc;

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3};

use crate::{
    data_structures::{material::Material, mesh::Mesh, transform::Transform},
    math::color::Color,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

#[derive(Clone, Debug)]
pub struct Object {
    pub name: String,
    /// Objects without a mesh are groups.
    pub mesh: Option<Arc<Mesh>>,
    pub material: Material,
    pub transform: Transform,
    pub visible: bool,
    parent: Option<ObjectId>,
}

impl Object {
    pub fn new(name: &str, mesh: Arc<Mesh>, material: Material) -> Self {
        Self {
            name: name.to_string(),
            mesh: Some(mesh),
            material,
            transform: Transform::new(),
            visible: true,
            parent: None,
        }
    }

    pub fn group(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mesh: None,
            material: Material::default(),
            transform: Transform::new(),
            visible: true,
            parent: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    /// Light shines from here towards the origin.
    pub position: Vector3<f32>,
}

impl DirectionalLight {
    /// Unit vector from the lit surface towards the light.
    pub fn direction(&self) -> Vector3<f32> {
        if self.position.magnitude2() == 0.0 {
            Vector3::unit_y()
        } else {
            self.position.normalize()
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    object: Option<Object>,
}

#[derive(Debug)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    pub background: Color,
    /// Alpha the background is cleared with. Layers composed later clear to 0.
    pub background_alpha: f32,
    pub ambient: Color,
    pub ambient_intensity: f32,
    pub directional: Option<DirectionalLight>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            background: Color::BLACK,
            background_alpha: 1.0,
            ambient: Color::WHITE,
            ambient_intensity: 0.0,
            directional: None,
        }
    }
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            ..Default::default()
        }
    }

    pub fn add(&mut self, object: Object) -> ObjectId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(object);
                ObjectId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    object: Some(object),
                });
                ObjectId {
                    index: self.slots.len() as u32 - 1,
                    generation: 0,
                }
            }
        }
    }

    /// Add `object` under `parent`. Returns `None` if the parent is gone.
    pub fn add_child(&mut self, parent: ObjectId, mut object: Object) -> Option<ObjectId> {
        self.get(parent)?;
        object.parent = Some(parent);
        Some(self.add(object))
    }

    /// Remove an object together with all its descendants.
    pub fn remove(&mut self, id: ObjectId) -> Option<Object> {
        self.get(id)?;
        let children: Vec<ObjectId> = self
            .ids()
            .filter(|child| self.get(*child).is_some_and(|o| o.parent == Some(id)))
            .collect();
        for child in children {
            self.remove(child);
        }
        let slot = &mut self.slots[id.index as usize];
        let object = slot.object.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        object
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_mut())
    }

    fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.object.as_ref().map(|_| ObjectId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.ids().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Model matrix of `id` including every ancestor's transform.
    pub fn world_matrix(&self, id: ObjectId) -> Option<Matrix4<f32>> {
        let object = self.get(id)?;
        let local = object.transform.to_matrix();
        Some(match object.parent {
            Some(parent) => self.world_matrix(parent).unwrap_or_else(Matrix4::identity) * local,
            None => local,
        })
    }

    fn is_shown(&self, object: &Object) -> bool {
        let mut current = Some(object);
        while let Some(o) = current {
            if !o.visible {
                return false;
            }
            current = o.parent.and_then(|p| self.get(p));
        }
        true
    }

    /// Objects with a mesh whose whole ancestry is visible, with their world
    /// matrices, in insertion order.
    pub fn iter_visible(&self) -> impl Iterator<Item = (ObjectId, &Object, Matrix4<f32>)> + '_ {
        self.ids().filter_map(move |id| {
            let object = self.get(id)?;
            if object.mesh.is_none() || !self.is_shown(object) {
                return None;
            }
            Some((id, object, self.world_matrix(id)?))
        })
    }

    pub fn clear_color(&self) -> wgpu::Color {
        wgpu::Color {
            a: self.background_alpha as f64,
            ..self.background.to_wgpu()
        }
    }

    pub fn ambient_light(&mut self, color: Color, intensity: f32) {
        self.ambient = color;
        self.ambient_intensity = intensity;
    }

    pub fn directional_light(&mut self, color: Color, intensity: f32, position: Vector3<f32>) {
        self.directional = Some(DirectionalLight {
            color,
            intensity,
            position,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn children_follow_their_parent() {
        let mut scene = Scene::default();
        let parent = scene.add(Object::group("parent").with_transform(Transform::from_position(1.0, 0.0, 0.0)));
        let child = scene
            .add_child(parent, Object::group("child").with_transform(Transform::from_position(0.0, 2.0, 0.0)))
            .unwrap();
        let origin = scene.world_matrix(child).unwrap() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin.truncate(), Vector3::new(1.0, 2.0, 0.0));
        assert_eq!(scene.get(child).unwrap().parent(), Some(parent));
    }

    #[test]
    fn removal_takes_descendants_and_invalidates_ids() {
        let mut scene = Scene::default();
        let root = scene.add(Object::group("root"));
        let child = scene.add_child(root, Object::group("child")).unwrap();
        let grandchild = scene.add_child(child, Object::group("grandchild")).unwrap();
        let other = scene.add(Object::group("other"));
        assert_eq!(scene.len(), 4);

        assert_eq!(scene.remove(root).map(|o| o.name), Some("root".to_string()));
        assert_eq!(scene.len(), 1);
        assert!(scene.get(grandchild).is_none());
        assert!(scene.get(other).is_some());

        // slot reuse does not revive the old id
        let reused = scene.add(Object::group("new"));
        assert!(scene.get(root).is_none());
        assert_eq!(scene.get(reused).unwrap().name, "new");
        assert_ne!(reused, root);
        assert!(scene.remove(root).is_none());
        assert!(scene.add_child(child, Object::group("orphan")).is_none());
    }

    #[test]
    fn groups_and_hidden_branches_are_not_drawn() {
        let mut scene = Scene::default();
        let root = scene.add(Object::group("root"));
        scene.add_child(root, Object::group("nested")).unwrap();
        assert_eq!(scene.iter_visible().count(), 0);
        scene.get_mut(root).unwrap().visible = false;
        assert!(!scene.is_shown(scene.get(root).unwrap()));
    }

    #[test]
    fn lights_are_configurable() {
        let mut scene = Scene::new(Color::from_hex(0xd9d9d9));
        scene.ambient_light(Color::WHITE, 1.0);
        scene.directional_light(Color::WHITE, 2.0, Vector3::new(0.0, 3.0, 0.0));
        assert_eq!(scene.ambient_intensity, 1.0);
        assert_eq!(scene.directional.unwrap().direction(), Vector3::unit_y());
    }
}
