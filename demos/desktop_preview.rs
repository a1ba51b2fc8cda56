//! Desktop Preview Example
//!
//! Runs the placement core without tracking hardware: the heuristic detector
//! places a model on a virtual floor, then on a wall added to the scene.
//!
//! Usage:
//!   cargo run --example desktop_preview -- [path/to/model.glb]
//!
//! A missing or broken model shows up as the placeholder box.

use std::sync::Arc;
use std::time::Duration;

use glam::{Quat, Vec3};
use myth_placement::{
    EngineConfig, ModelFormat, ModelGraph, NullPlatform, PlacementEngine, PlacementMode, PlacementPhase, Ray,
    SceneObject, Transform,
};
use myth_placement::scene::{Geometry, Material, Mesh};

#[tokio::main]
async fn main() -> myth_placement::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let model = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/assets/chair.glb".to_string());

    let mut engine = PlacementEngine::new(NullPlatform, EngineConfig::default())?;
    println!("Status: {}", engine.status());

    // A wall three meters ahead for wall mode.
    let wall = Mesh::new(Arc::new(Geometry::new_plane(4.0, 3.0)), Material::default());
    engine.scene_mut().add(
        SceneObject::new("wall", ModelGraph::from_mesh(wall))
            .with_transform(Transform::from_position_rotation(Vec3::new(0.0, 1.5, -3.0), Quat::IDENTITY)),
    );

    let format = ModelFormat::from_url(&model).unwrap_or(ModelFormat::Portable);
    tokio::spawn(engine.select_asset(&model, format));

    // Camera at eye height, slowly panning down toward the floor.
    let eye = Vec3::new(0.3, 1.6, 0.0);
    let mut loaded = false;
    for step in 0..30 {
        let pitch = -0.02 * step as f32;
        let ray = Ray::from_pose(eye, Quat::from_rotation_x(pitch));
        let output = engine.tick(&ray);

        if let Some(resource) = &output.loaded {
            loaded = true;
            println!(
                "Loaded {} (fallback: {}) metrics: {}",
                resource.source_url(),
                resource.is_fallback(),
                serde_json::to_string(&resource.metrics()).unwrap_or_default()
            );
        }
        for diagnostic in &output.diagnostics {
            println!("Diagnostic for {}: {}", diagnostic.url, diagnostic.message);
        }
        if let Some(candidate) = output.preview {
            println!(
                "frame {:>3} {:?} on {} at {:.2?}",
                output.frame,
                output.phase,
                candidate.surface_type(),
                candidate.point()
            );
        }

        if loaded && output.phase == PlacementPhase::Valid {
            if let Some(result) = engine.commit() {
                println!("Placed on {} at {:.2?}", result.surface_type, result.position);
                if engine.mode() == PlacementMode::Wall {
                    break;
                }
                engine.toggle_mode();
            }
        }

        tokio::time::sleep(Duration::from_millis(16)).await;
    }

    Ok(())
}
