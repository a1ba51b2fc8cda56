//! Shared test fixtures: a minimal GLB writer, a counting decoder and a
//! scripted spatial platform.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use myth_placement::assets::{DecodedModel, GltfDecoder, ModelDecoder};
use myth_placement::errors::{PlacementError, Result};
use myth_placement::math::Ray;
use myth_placement::session::{
    HitPose, HitTestSourceHandle, ReferenceFrameHandle, SessionSupport, SpatialPlatform,
};

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn vec3_approx(a: glam::Vec3, b: glam::Vec3) -> bool {
    (a - b).length() < EPSILON
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// GLB writer
// ============================================================================

/// Input for [`build_glb`].
pub struct GlbSpec {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
    /// `(name, last keyframe time)` of a translation animation on node 0.
    pub animation: Option<(&'static str, f32)>,
    /// Node translation.
    pub translation: [f32; 3],
}

impl Default for GlbSpec {
    fn default() -> Self {
        Self {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
            animation: None,
            translation: [0.0, 0.0, 0.0],
        }
    }
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}

/// Writes a single-mesh binary glTF.
pub fn build_glb(spec: &GlbSpec) -> Vec<u8> {
    let mut bin = Vec::new();

    let positions_offset = bin.len();
    for p in &spec.positions {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let positions_len = bin.len() - positions_offset;

    let indices_offset = bin.len();
    for i in &spec.indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let indices_len = bin.len() - indices_offset;
    pad_to_four(&mut bin, 0);

    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in &spec.positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }

    let mut buffer_views = vec![
        json!({ "buffer": 0, "byteOffset": positions_offset, "byteLength": positions_len, "target": 34962 }),
        json!({ "buffer": 0, "byteOffset": indices_offset, "byteLength": indices_len, "target": 34963 }),
    ];
    let mut accessors = vec![
        json!({
            "bufferView": 0, "componentType": 5126, "count": spec.positions.len(),
            "type": "VEC3", "min": min, "max": max
        }),
        json!({ "bufferView": 1, "componentType": 5123, "count": spec.indices.len(), "type": "SCALAR" }),
    ];
    let mut animations = Vec::new();

    if let Some((name, duration)) = spec.animation {
        let times_offset = bin.len();
        for t in [0.0_f32, duration] {
            bin.extend_from_slice(&t.to_le_bytes());
        }
        let values_offset = bin.len();
        for v in [0.0_f32, 0.0, 0.0, 0.0, 1.0, 0.0] {
            bin.extend_from_slice(&v.to_le_bytes());
        }

        buffer_views.push(json!({ "buffer": 0, "byteOffset": times_offset, "byteLength": 8 }));
        buffer_views.push(json!({ "buffer": 0, "byteOffset": values_offset, "byteLength": 24 }));
        accessors.push(json!({
            "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
            "min": [0.0], "max": [duration]
        }));
        accessors.push(json!({ "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" }));
        animations.push(json!({
            "name": name,
            "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }],
            "samplers": [{ "input": 2, "output": 3, "interpolation": "LINEAR" }]
        }));
    }

    let mut document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "Chair", "mesh": 0, "translation": spec.translation }],
        "meshes": [{
            "name": "Chair",
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }]
        }],
        "materials": [{
            "name": "Wood",
            "pbrMetallicRoughness": { "baseColorFactor": [0.6, 0.4, 0.2, 1.0] }
        }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": buffer_views,
        "accessors": accessors,
    });
    if !animations.is_empty() {
        document["animations"] = json!(animations);
    }

    let mut json_chunk = serde_json::to_vec(&document).unwrap();
    pad_to_four(&mut json_chunk, b' ');

    let total_len = 12 + 8 + json_chunk.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total_len);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_len as u32).to_le_bytes());

    glb.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F_534Au32.to_le_bytes());
    glb.extend_from_slice(&json_chunk);

    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E_4942u32.to_le_bytes());
    glb.extend_from_slice(&bin);

    glb
}

/// One triangle spanning (0,0,0), (1,0,0), (0,1,0).
pub fn triangle_glb() -> Vec<u8> {
    build_glb(&GlbSpec::default())
}

// ============================================================================
// Counting decoder
// ============================================================================

/// glTF decoder that counts invocations.
#[derive(Default)]
pub struct CountingDecoder {
    pub calls: AtomicUsize,
}

impl CountingDecoder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ModelDecoder for CountingDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedModel> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        GltfDecoder.decode(bytes)
    }
}

// ============================================================================
// Scripted platform
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Probe,
    RequestSession,
    AcquireFrame(u64),
    AcquireSource(u64),
    HitTest,
    ReleaseSource(u64),
    ReleaseFrame(u64),
    EndSession,
}

#[derive(Debug, Default)]
pub struct PlatformLog {
    pub calls: Vec<Call>,
    /// Poses returned by every hit test.
    pub hits: Vec<HitPose>,
    next_id: u64,
}

impl PlatformLog {
    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn releases(&self) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::ReleaseSource(_) | Call::ReleaseFrame(_)))
            .cloned()
            .collect()
    }
}

pub struct MockPlatform {
    pub support: SessionSupport,
    pub fail_session: bool,
    pub fail_frame: bool,
    pub fail_source: bool,
    pub log: Rc<RefCell<PlatformLog>>,
}

impl MockPlatform {
    pub fn supported() -> (Self, Rc<RefCell<PlatformLog>>) {
        Self::with_support(SessionSupport::Supported)
    }

    pub fn with_support(support: SessionSupport) -> (Self, Rc<RefCell<PlatformLog>>) {
        let log = Rc::new(RefCell::new(PlatformLog::default()));
        let platform = Self {
            support,
            fail_session: false,
            fail_frame: false,
            fail_source: false,
            log: log.clone(),
        };
        (platform, log)
    }

    fn next_id(&self) -> u64 {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        log.next_id
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().calls.push(call);
    }
}

impl SpatialPlatform for MockPlatform {
    fn probe_support(&mut self) -> SessionSupport {
        self.record(Call::Probe);
        self.support
    }

    fn request_session(&mut self) -> Result<()> {
        self.record(Call::RequestSession);
        if self.fail_session {
            return Err(PlacementError::SessionStartFailed("scripted".to_string()));
        }
        Ok(())
    }

    fn acquire_reference_frame(&mut self) -> Result<ReferenceFrameHandle> {
        if self.fail_frame {
            return Err(PlacementError::ReferenceFrameUnavailable("scripted".to_string()));
        }
        let id = self.next_id();
        self.record(Call::AcquireFrame(id));
        Ok(ReferenceFrameHandle::new(id))
    }

    fn acquire_hit_test_source(&mut self, _frame: &ReferenceFrameHandle) -> Result<HitTestSourceHandle> {
        if self.fail_source {
            return Err(PlacementError::HitTestSourceUnavailable("scripted".to_string()));
        }
        let id = self.next_id();
        self.record(Call::AcquireSource(id));
        Ok(HitTestSourceHandle::new(id))
    }

    fn hit_test(&mut self, _source: &HitTestSourceHandle, _frame: &ReferenceFrameHandle, _ray: &Ray) -> Vec<HitPose> {
        self.record(Call::HitTest);
        self.log.borrow().hits.clone()
    }

    fn release_hit_test_source(&mut self, source: HitTestSourceHandle) {
        self.record(Call::ReleaseSource(source.id()));
    }

    fn release_reference_frame(&mut self, frame: ReferenceFrameHandle) {
        self.record(Call::ReleaseFrame(frame.id()));
    }

    fn end_session(&mut self) {
        self.record(Call::EndSession);
    }
}
