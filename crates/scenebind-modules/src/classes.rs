//! Native class hierarchy of the renderer.
//!
//! ```text
//! Object
//! ├── Scene
//! ├── Shape ── Mesh
//! ├── Texture
//! ├── Volume
//! ├── ReconstructionFilter
//! ├── Endpoint ─┬─ Sensor ── ProjectiveCamera
//! │             └─ Emitter
//! ├── BSDF
//! ├── Film
//! ├── Integrator ─┬─ SamplingIntegrator ── MonteCarloIntegrator
//! │               └─ AdjointIntegrator
//! ├── Sampler
//! ├── PhaseFunction
//! └── Medium
//! ```
//!
//! Record types sit outside the hierarchy: they are exposed by value and
//! never returned through a base-typed handle.

use scenebind_core::Class;

pub static OBJECT: Class = Class::new_abstract("Object", None);

// =============================================================================
// SCENE-GRAPH CLASSES
// =============================================================================

pub static SCENE: Class = Class::new("Scene", Some(&OBJECT));
pub static SHAPE: Class = Class::new("Shape", Some(&OBJECT));
pub static MESH: Class = Class::new("Mesh", Some(&SHAPE));
pub static TEXTURE: Class = Class::new("Texture", Some(&OBJECT));
pub static VOLUME: Class = Class::new("Volume", Some(&OBJECT));
pub static RECONSTRUCTION_FILTER: Class = Class::new("ReconstructionFilter", Some(&OBJECT));
pub static ENDPOINT: Class = Class::new_abstract("Endpoint", Some(&OBJECT));
pub static SENSOR: Class = Class::new("Sensor", Some(&ENDPOINT));
pub static PROJECTIVE_CAMERA: Class = Class::new("ProjectiveCamera", Some(&SENSOR));
pub static EMITTER: Class = Class::new("Emitter", Some(&ENDPOINT));
pub static BSDF: Class = Class::new("BSDF", Some(&OBJECT));
pub static FILM: Class = Class::new("Film", Some(&OBJECT));
pub static INTEGRATOR: Class = Class::new_abstract("Integrator", Some(&OBJECT));
pub static SAMPLING_INTEGRATOR: Class = Class::new("SamplingIntegrator", Some(&INTEGRATOR));
pub static MONTE_CARLO_INTEGRATOR: Class =
    Class::new("MonteCarloIntegrator", Some(&SAMPLING_INTEGRATOR));
pub static ADJOINT_INTEGRATOR: Class = Class::new("AdjointIntegrator", Some(&INTEGRATOR));
pub static SAMPLER: Class = Class::new("Sampler", Some(&OBJECT));
pub static PHASE_FUNCTION: Class = Class::new("PhaseFunction", Some(&OBJECT));
pub static MEDIUM: Class = Class::new("Medium", Some(&OBJECT));

// =============================================================================
// RECORD CLASSES
// =============================================================================

pub static BSDF_SAMPLE: Class = Class::new("BSDFSample", None);
pub static INTERACTION: Class = Class::new("Interaction", None);
pub static SURFACE_INTERACTION: Class = Class::new("SurfaceInteraction", Some(&INTERACTION));
pub static MEDIUM_INTERACTION: Class = Class::new("MediumInteraction", Some(&INTERACTION));
pub static PRELIMINARY_INTERSECTION: Class = Class::new("PreliminaryIntersection", None);
pub static POSITION_SAMPLE: Class = Class::new("PositionSample", None);
pub static DIRECTION_SAMPLE: Class = Class::new("DirectionSample", Some(&POSITION_SAMPLE));
pub static IMAGE_BLOCK: Class = Class::new("ImageBlock", None);
pub static MICROFACET_DISTRIBUTION: Class = Class::new("MicrofacetDistribution", None);
pub static SHAPE_KD_TREE: Class = Class::new("ShapeKDTree", None);
pub static VOLUME_GRID: Class = Class::new("VolumeGrid", None);

/// Polymorphic classes, most specific first.
///
/// This is the order the render module probes in; no class appears after
/// one of its ancestors.
pub static PROBE_ORDER: [&Class; 19] = [
    &SCENE,
    &MESH,
    &SHAPE,
    &TEXTURE,
    &VOLUME,
    &RECONSTRUCTION_FILTER,
    &PROJECTIVE_CAMERA,
    &SENSOR,
    &EMITTER,
    &ENDPOINT,
    &BSDF,
    &FILM,
    &MONTE_CARLO_INTEGRATOR,
    &SAMPLING_INTEGRATOR,
    &ADJOINT_INTEGRATOR,
    &INTEGRATOR,
    &SAMPLER,
    &PHASE_FUNCTION,
    &MEDIUM,
];

pub static RECORDS: [&Class; 11] = [
    &BSDF_SAMPLE,
    &INTERACTION,
    &SURFACE_INTERACTION,
    &MEDIUM_INTERACTION,
    &PRELIMINARY_INTERSECTION,
    &POSITION_SAMPLE,
    &DIRECTION_SAMPLE,
    &IMAGE_BLOCK,
    &MICROFACET_DISTRIBUTION,
    &SHAPE_KD_TREE,
    &VOLUME_GRID,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_order_is_most_specific_first() {
        for (i, earlier) in PROBE_ORDER.iter().enumerate() {
            for later in &PROBE_ORDER[i + 1..] {
                assert!(
                    !later.strictly_derives_from(earlier),
                    "{} must come before {}",
                    later,
                    earlier
                );
            }
        }
    }

    #[test]
    fn polymorphic_classes_derive_from_object() {
        assert!(PROBE_ORDER.iter().all(|class| class.derives_from(&OBJECT)));
        assert!(RECORDS.iter().all(|class| !class.derives_from(&OBJECT)));
    }

    #[test]
    fn camera_is_a_sensor_and_an_endpoint() {
        assert!(PROJECTIVE_CAMERA.derives_from(&SENSOR));
        assert!(PROJECTIVE_CAMERA.derives_from(&ENDPOINT));
        assert!(!EMITTER.derives_from(&SENSOR));
    }
}
