//! Pointer picking: pixel -> ray -> nearest proxy

use glam::Vec3;

use super::{Camera, ProxyHandle, Ray, Scene};

/// Convert viewport pixel coordinates to normalized device coordinates.
///
/// X grows right in [-1, 1]; Y is flipped so +1 is the top of the viewport.
pub fn pointer_ndc(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    ((x / width) * 2.0 - 1.0, -(y / height) * 2.0 + 1.0)
}

/// Nearest non-negative ray parameter hitting a sphere, if any.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.dir.dot(ray.dir);
    if a <= 0.0 {
        return None;
    }

    let b = 2.0 * oc.dot(ray.dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }

    let sqrt_disc = disc.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    if t1 >= 0.0 {
        Some(t1)
    } else if t2 >= 0.0 {
        Some(t2)
    } else {
        None
    }
}

/// Resolve a pointer-down at viewport pixel (x, y) to the closest proxy.
///
/// Every live proxy is tested, the central body included, so stations
/// behind the planet cannot be picked through it. Returns None when the ray
/// misses everything.
pub fn pick_proxy(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    camera: &Camera,
    scene: &Scene,
) -> Option<ProxyHandle> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }

    let (ndc_x, ndc_y) = pointer_ndc(x, y, width, height);
    let ray = camera.ray_through(ndc_x, ndc_y, width / height);

    let mut closest: Option<(f32, ProxyHandle)> = None;
    for (handle, proxy) in scene.iter() {
        if let Some(t) = ray_sphere(&ray, proxy.position(), proxy.radius) {
            match closest {
                Some((best, _)) if t >= best => {}
                _ => closest = Some((t, handle)),
            }
        }
    }

    closest.map(|(_, handle)| handle)
}
