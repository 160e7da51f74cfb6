//! Scene graph: central body, visual proxies, render snapshots

use std::collections::HashMap;

use glam::Vec3;

/// Central body radius in render units. All world geometry is expressed in
/// Earth radii.
pub const EARTH_RADIUS_RENDER: f32 = 1.0;

/// Divisor converting catalog sprite sizes to world radii (a size-50 sprite
/// spans 0.01 Earth radii, matching the original display scale).
pub const SPRITE_SCALE_FACTOR: f32 = 5000.0;

/// Stable handle to a visual proxy in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyHandle(u64);

/// Proxy geometry kind. Stations use sprites uniformly; the central body is
/// the one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyShape {
    Sprite,
    Mesh,
}

/// Material tint applied to a proxy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Per-batch base color
    Base([f32; 3]),
    Selected,
    Highlighted,
}

impl Material {
    pub fn color(self) -> [f32; 3] {
        match self {
            Material::Base(color) => color,
            Material::Selected => [1.0, 0.0, 0.0],
            Material::Highlighted => [0.988, 0.639, 0.0],
        }
    }
}

/// A renderable stand-in for one tracked object.
#[derive(Debug, Clone)]
pub struct VisualProxy {
    pub shape: ProxyShape,
    position: Vec3,
    material: Material,
    /// World-space radius, used for both drawing and ray tests
    pub radius: f32,
    pub visible: bool,
}

impl VisualProxy {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }
}

/// The 3D world: background, central body, and one proxy per station.
pub struct Scene {
    pub background: [f32; 3],
    proxies: HashMap<ProxyHandle, VisualProxy>,
    earth: ProxyHandle,
    next_handle: u64,
}

impl Scene {
    pub fn new(background: [f32; 3]) -> Self {
        let mut scene = Self {
            background,
            proxies: HashMap::new(),
            earth: ProxyHandle(0),
            next_handle: 0,
        };
        scene.earth = scene.insert(VisualProxy {
            shape: ProxyShape::Mesh,
            position: Vec3::ZERO,
            material: Material::Base([0.1, 0.24, 0.47]),
            radius: EARTH_RADIUS_RENDER,
            visible: true,
        });
        scene
    }

    fn insert(&mut self, proxy: VisualProxy) -> ProxyHandle {
        let handle = ProxyHandle(self.next_handle);
        self.next_handle += 1;
        self.proxies.insert(handle, proxy);
        handle
    }

    /// Create a sprite proxy for a station.
    pub fn create_sprite(&mut self, material: Material, catalog_size: f32) -> ProxyHandle {
        self.insert(VisualProxy {
            shape: ProxyShape::Sprite,
            position: Vec3::ZERO,
            material,
            radius: catalog_size / SPRITE_SCALE_FACTOR,
            visible: true,
        })
    }

    pub fn proxy(&self, handle: ProxyHandle) -> Option<&VisualProxy> {
        self.proxies.get(&handle)
    }

    pub fn proxy_mut(&mut self, handle: ProxyHandle) -> Option<&mut VisualProxy> {
        self.proxies.get_mut(&handle)
    }

    /// Remove a proxy from the scene. Disposing an already-removed handle is
    /// a no-op.
    pub fn dispose_proxy(&mut self, handle: ProxyHandle) {
        if handle == self.earth {
            return;
        }
        self.proxies.remove(&handle);
    }

    pub fn earth_handle(&self) -> ProxyHandle {
        self.earth
    }

    /// All live proxies, central body included.
    pub fn iter(&self) -> impl Iterator<Item = (ProxyHandle, &VisualProxy)> {
        self.proxies.iter().map(|(h, p)| (*h, p))
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    /// Drop every proxy, central body included. Used on engine disposal.
    pub fn clear(&mut self) {
        self.proxies.clear();
    }
}

/// One station sprite, ready to draw.
#[derive(Debug, Clone, Copy)]
pub struct SpriteInstance {
    /// Position in world space (Earth radii)
    pub position: Vec3,
    pub color: [f32; 3],
    /// Catalog size (screen-space sprites; not distance-attenuated)
    pub size: f32,
}

/// Orbit track polyline, ready to draw.
#[derive(Debug, Clone)]
pub struct OrbitLine {
    pub points: Vec<Vec3>,
    pub color: [f32; 3],
}

/// Immutable snapshot of everything the shell paints for one frame.
#[derive(Default)]
pub struct SceneRenderData {
    pub background: [f32; 3],
    pub earth_radius: f32,
    pub sprites: Vec<SpriteInstance>,
    pub orbit_lines: Vec<OrbitLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let mut scene = Scene::new([0.0; 3]);
        let a = scene.create_sprite(Material::Base([1.0, 0.0, 0.0]), 50.0);
        let b = scene.create_sprite(Material::Base([1.0, 0.0, 0.0]), 50.0);
        assert_ne!(a, b);
        assert_ne!(a, scene.earth_handle());
        assert_eq!(scene.proxy_count(), 3);
    }

    #[test]
    fn test_double_dispose_is_noop() {
        let mut scene = Scene::new([0.0; 3]);
        let a = scene.create_sprite(Material::Selected, 50.0);
        scene.dispose_proxy(a);
        assert!(scene.proxy(a).is_none());
        scene.dispose_proxy(a);
        assert_eq!(scene.proxy_count(), 1);
    }

    #[test]
    fn test_earth_survives_dispose() {
        let mut scene = Scene::new([0.0; 3]);
        let earth = scene.earth_handle();
        scene.dispose_proxy(earth);
        assert!(scene.proxy(earth).is_some());
    }
}
