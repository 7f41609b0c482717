//! Effects: a WGSL module described by a manifest of named parameters and
//! techniques.
//!
//! A parameter is a named slot at a fixed byte offset inside the effect's
//! single uniform block. A technique is a named, ordered list of passes, each
//! naming a vertex and fragment entry point. Names are resolved once into
//! [`ParameterHandle`]s and [`TechniqueHandle`]s; per-frame code only writes
//! through handles into [`EffectParameters`].

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("effect '{effect}' has no {what} named '{name}'")]
    ShaderBindingMissing {
        effect: String,
        what: &'static str,
        name: String,
    },

    #[error("parameter '{name}' is declared as {declared:?}, not {requested:?}")]
    ParameterKindMismatch {
        name: String,
        declared: ParameterKind,
        requested: ParameterKind,
    },

    #[error("parameter '{name}' at offset {offset} does not fit a {block_size}-byte block")]
    ParameterOutOfRange {
        name: String,
        offset: u32,
        block_size: usize,
    },

    #[error("invalid effect manifest: {0}")]
    InvalidManifest(String),

    #[error("effect '{effect}' has invalid WGSL:\n{message}")]
    Shader { effect: String, message: String },

    #[error("failed to parse effect manifest: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Value type of a parameter, mirroring its WGSL member type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    /// `mat4x4<f32>`, column-major.
    Matrix,
    /// `vec3<f32>`
    Vector3,
    /// `f32`
    Float,
    /// `u32`, 0 or 1. WGSL has no host-shareable `bool`.
    Bool,
}

impl ParameterKind {
    /// Bytes written for a value of this kind.
    pub fn size(self) -> u32 {
        match self {
            ParameterKind::Matrix => 64,
            ParameterKind::Vector3 => 12,
            ParameterKind::Float | ParameterKind::Bool => 4,
        }
    }

    /// Required offset alignment inside a uniform block.
    pub fn alignment(self) -> u32 {
        match self {
            ParameterKind::Matrix | ParameterKind::Vector3 => 16,
            ParameterKind::Float | ParameterKind::Bool => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    pub kind: ParameterKind,
    /// Byte offset inside the uniform block.
    pub offset: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassDecl {
    pub name: String,
    pub vertex_entry: String,
    pub fragment_entry: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TechniqueDecl {
    pub name: String,
    pub passes: Vec<PassDecl>,
}

/// Serialized description of an effect, stored as RON next to its WGSL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectManifest {
    pub name: String,
    /// Size of the uniform block in bytes, a multiple of 16.
    pub uniform_size: u32,
    pub parameters: Vec<ParameterDecl>,
    pub techniques: Vec<TechniqueDecl>,
}

impl EffectManifest {
    pub fn from_ron(source: &str) -> Result<Self, EffectError> {
        let manifest: Self = ron::from_str(source)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check layout and naming rules.
    ///
    /// Every parameter must be aligned for its kind, fit inside the block and
    /// not overlap another. Names are unique. Each technique has at least one
    /// pass.
    pub fn validate(&self) -> Result<(), EffectError> {
        let invalid = |msg: String| Err(EffectError::InvalidManifest(msg));

        if self.uniform_size == 0 || self.uniform_size % 16 != 0 {
            return invalid(format!(
                "uniform_size {} is not a positive multiple of 16",
                self.uniform_size
            ));
        }

        let mut spans: Vec<(u32, u32, &str)> = Vec::with_capacity(self.parameters.len());
        for param in &self.parameters {
            let (kind, offset) = (param.kind, param.offset);
            if offset % kind.alignment() != 0 {
                return invalid(format!(
                    "parameter '{}' at offset {offset} is not {}-byte aligned",
                    param.name,
                    kind.alignment()
                ));
            }
            let end = match offset.checked_add(kind.size()) {
                Some(end) if end <= self.uniform_size => end,
                _ => {
                    return invalid(format!(
                        "parameter '{}' at offset {offset} runs past uniform_size {}",
                        param.name, self.uniform_size
                    ));
                }
            };
            if let Some((_, _, other)) = spans
                .iter()
                .find(|(start, stop, _)| offset < *stop && *start < end)
            {
                return invalid(format!("parameter '{}' overlaps '{other}'", param.name));
            }
            if spans.iter().any(|(_, _, name)| *name == param.name) {
                return invalid(format!("duplicate parameter '{}'", param.name));
            }
            spans.push((offset, end, param.name.as_str()));
        }

        for (i, technique) in self.techniques.iter().enumerate() {
            if technique.passes.is_empty() {
                return invalid(format!("technique '{}' has no passes", technique.name));
            }
            if self.techniques[..i].iter().any(|t| t.name == technique.name) {
                return invalid(format!("duplicate technique '{}'", technique.name));
            }
        }
        Ok(())
    }
}

/// Resolved parameter slot. Cheap to copy; valid only for the effect that
/// produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterHandle {
    index: usize,
    kind: ParameterKind,
    offset: u32,
}

impl ParameterHandle {
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TechniqueHandle(usize);

/// A validated manifest together with its WGSL source.
#[derive(Clone, Debug)]
pub struct Effect {
    manifest: EffectManifest,
    source: String,
}

impl Effect {
    /// Validate the manifest and check that every pass names entry points the
    /// WGSL module actually defines, with the right stage.
    pub fn new(manifest: EffectManifest, source: impl Into<String>) -> Result<Self, EffectError> {
        manifest.validate()?;
        let effect = Self {
            manifest,
            source: source.into(),
        };
        effect.check_entry_points()?;
        Ok(effect)
    }

    /// Parse a RON manifest and pair it with WGSL source.
    pub fn from_sources(manifest: &str, source: impl Into<String>) -> Result<Self, EffectError> {
        Self::new(EffectManifest::from_ron(manifest)?, source)
    }

    /// Read a manifest file and its WGSL module from disk.
    pub fn load(manifest_path: &Path, shader_path: &Path) -> Result<Self, EffectError> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|source| EffectError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        let effect = Self::from_sources(&read(manifest_path)?, read(shader_path)?)?;
        log::info!(
            "Loaded effect '{}' from {}",
            effect.name(),
            manifest_path.display()
        );
        Ok(effect)
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn manifest(&self) -> &EffectManifest {
        &self.manifest
    }

    pub fn uniform_size(&self) -> u32 {
        self.manifest.uniform_size
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Result<ParameterHandle, EffectError> {
        self.manifest
            .parameters
            .iter()
            .position(|p| p.name == name)
            .map(|index| {
                let decl = &self.manifest.parameters[index];
                ParameterHandle {
                    index,
                    kind: decl.kind,
                    offset: decl.offset,
                }
            })
            .ok_or_else(|| self.missing("parameter", name))
    }

    /// Look up a parameter and require it to be declared as `kind`.
    pub fn typed_parameter(
        &self,
        name: &str,
        kind: ParameterKind,
    ) -> Result<ParameterHandle, EffectError> {
        let handle = self.parameter(name)?;
        if handle.kind != kind {
            return Err(EffectError::ParameterKindMismatch {
                name: name.to_string(),
                declared: handle.kind,
                requested: kind,
            });
        }
        Ok(handle)
    }

    pub fn technique(&self, name: &str) -> Result<TechniqueHandle, EffectError> {
        self.manifest
            .techniques
            .iter()
            .position(|t| t.name == name)
            .map(TechniqueHandle)
            .ok_or_else(|| self.missing("technique", name))
    }

    /// Passes of a resolved technique, in application order.
    pub fn passes(&self, technique: TechniqueHandle) -> &[PassDecl] {
        self.manifest
            .techniques
            .get(technique.0)
            .map(|t| t.passes.as_slice())
            .unwrap_or_default()
    }

    fn check_entry_points(&self) -> Result<(), EffectError> {
        use wgpu::naga::ShaderStage;

        let module = wgpu::naga::front::wgsl::parse_str(&self.source).map_err(|e| {
            EffectError::Shader {
                effect: self.manifest.name.clone(),
                message: e.emit_to_string(&self.source),
            }
        })?;
        let defines = |name: &str, stage: ShaderStage| {
            module
                .entry_points
                .iter()
                .any(|ep| ep.name == name && ep.stage == stage)
        };

        for pass in self.manifest.techniques.iter().flat_map(|t| &t.passes) {
            if !defines(&pass.vertex_entry, ShaderStage::Vertex) {
                return Err(self.missing("vertex entry point", &pass.vertex_entry));
            }
            if !defines(&pass.fragment_entry, ShaderStage::Fragment) {
                return Err(self.missing("fragment entry point", &pass.fragment_entry));
            }
        }
        Ok(())
    }

    fn missing(&self, what: &'static str, name: &str) -> EffectError {
        EffectError::ShaderBindingMissing {
            effect: self.manifest.name.clone(),
            what,
            name: name.to_string(),
        }
    }
}

/// CPU staging copy of an effect's uniform block.
#[derive(Clone, Debug)]
pub struct EffectParameters {
    names: Vec<String>,
    bytes: Vec<u8>,
}

impl EffectParameters {
    /// Zeroed block sized for `effect`.
    pub fn new(effect: &Effect) -> Self {
        Self {
            names: effect
                .manifest
                .parameters
                .iter()
                .map(|p| p.name.clone())
                .collect(),
            bytes: vec![0; effect.uniform_size() as usize],
        }
    }

    pub fn set_matrix(&mut self, handle: ParameterHandle, value: Mat4) -> Result<(), EffectError> {
        self.write(handle, ParameterKind::Matrix, bytemuck::bytes_of(&value.to_cols_array()))
    }

    pub fn set_vector3(
        &mut self,
        handle: ParameterHandle,
        value: Vec3,
    ) -> Result<(), EffectError> {
        self.write(handle, ParameterKind::Vector3, bytemuck::bytes_of(&value.to_array()))
    }

    pub fn set_float(&mut self, handle: ParameterHandle, value: f32) -> Result<(), EffectError> {
        self.write(handle, ParameterKind::Float, bytemuck::bytes_of(&value))
    }

    pub fn set_bool(&mut self, handle: ParameterHandle, value: bool) -> Result<(), EffectError> {
        self.write(handle, ParameterKind::Bool, bytemuck::bytes_of(&u32::from(value)))
    }

    /// Block contents for `Queue::write_buffer`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn write(
        &mut self,
        handle: ParameterHandle,
        requested: ParameterKind,
        value: &[u8],
    ) -> Result<(), EffectError> {
        if handle.kind != requested {
            return Err(EffectError::ParameterKindMismatch {
                name: self.names.get(handle.index).cloned().unwrap_or_default(),
                declared: handle.kind,
                requested,
            });
        }
        let start = handle.offset as usize;
        let block_size = self.bytes.len();
        let slot = start
            .checked_add(value.len())
            .and_then(|end| self.bytes.get_mut(start..end))
            .ok_or_else(|| EffectError::ParameterOutOfRange {
                name: self.names.get(handle.index).cloned().unwrap_or_default(),
                offset: handle.offset,
                block_size,
            })?;
        slot.copy_from_slice(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"(
        name: "Test",
        uniform_size: 96,
        parameters: [
            (name: "xMatrix", kind: Matrix, offset: 0),
            (name: "xDirection", kind: Vector3, offset: 64),
            (name: "xScale", kind: Float, offset: 76),
            (name: "xToggle", kind: Bool, offset: 80),
        ],
        techniques: [
            (name: "Plain", passes: [(name: "P0", vertex_entry: "vs_main", fragment_entry: "fs_main")]),
        ],
    )"#;

    const SHADER: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    return vec4<f32>(f32(index), 0.0, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;

    fn effect() -> Effect {
        Effect::from_sources(MANIFEST, SHADER).unwrap()
    }

    fn manifest_with(parameters: Vec<ParameterDecl>, uniform_size: u32) -> EffectManifest {
        EffectManifest {
            name: "M".into(),
            uniform_size,
            parameters,
            techniques: vec![],
        }
    }

    fn decl(name: &str, kind: ParameterKind, offset: u32) -> ParameterDecl {
        ParameterDecl {
            name: name.into(),
            kind,
            offset,
        }
    }

    #[test]
    fn test_parse_manifest() {
        let effect = effect();
        assert_eq!(effect.name(), "Test");
        assert_eq!(effect.uniform_size(), 96);
        assert_eq!(effect.manifest().parameters.len(), 4);
        assert_eq!(effect.source(), SHADER);
    }

    #[test]
    fn test_resolve_parameter_and_technique() {
        let effect = effect();
        let handle = effect.parameter("xScale").unwrap();
        assert_eq!(handle.kind(), ParameterKind::Float);
        assert_eq!(handle.offset(), 76);

        let technique = effect.technique("Plain").unwrap();
        let passes = effect.passes(technique);
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].vertex_entry, "vs_main");
    }

    #[test]
    fn test_missing_names_fail() {
        let effect = effect();
        assert!(matches!(
            effect.parameter("xNope"),
            Err(EffectError::ShaderBindingMissing { what: "parameter", .. })
        ));
        let err = effect.technique("Colored").unwrap_err();
        assert!(err.to_string().contains("technique named 'Colored'"));
    }

    #[test]
    fn test_typed_lookup_checks_kind() {
        let effect = effect();
        assert!(effect.typed_parameter("xMatrix", ParameterKind::Matrix).is_ok());
        assert!(matches!(
            effect.typed_parameter("xMatrix", ParameterKind::Float),
            Err(EffectError::ParameterKindMismatch {
                declared: ParameterKind::Matrix,
                requested: ParameterKind::Float,
                ..
            })
        ));
    }

    #[test]
    fn test_setters_write_at_offsets() {
        let effect = effect();
        let mut params = EffectParameters::new(&effect);
        assert_eq!(params.as_bytes().len(), 96);

        params
            .set_matrix(effect.parameter("xMatrix").unwrap(), Mat4::from_scale(Vec3::splat(2.0)))
            .unwrap();
        params
            .set_vector3(effect.parameter("xDirection").unwrap(), Vec3::new(1.0, 2.0, 3.0))
            .unwrap();
        params.set_float(effect.parameter("xScale").unwrap(), 0.5).unwrap();
        params.set_bool(effect.parameter("xToggle").unwrap(), true).unwrap();

        let words: Vec<[u8; 4]> = params
            .as_bytes()
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        let float = |i: usize| f32::from_ne_bytes(words[i]);
        assert_eq!(float(0), 2.0);
        assert_eq!(float(5), 2.0);
        assert_eq!(float(15), 1.0);
        assert_eq!([float(16), float(17), float(18)], [1.0, 2.0, 3.0]);
        assert_eq!(float(19), 0.5);
        assert_eq!(u32::from_ne_bytes(words[20]), 1);
    }

    #[test]
    fn test_setter_rejects_wrong_kind() {
        let effect = effect();
        let mut params = EffectParameters::new(&effect);
        let err = params
            .set_float(effect.parameter("xToggle").unwrap(), 1.0)
            .unwrap_err();
        assert!(matches!(
            err,
            EffectError::ParameterKindMismatch { ref name, .. } if name == "xToggle"
        ));
        assert!(params.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_handle_outside_block_is_an_error() {
        let small = Effect::from_sources(
            r#"(name: "Small", uniform_size: 16, parameters: [(name: "x", kind: Float, offset: 0)], techniques: [])"#,
            SHADER,
        )
        .unwrap();
        let mut params = EffectParameters::new(&small);

        let foreign = effect().parameter("xToggle").unwrap();
        assert!(matches!(
            params.set_bool(foreign, true),
            Err(EffectError::ParameterOutOfRange {
                offset: 80,
                block_size: 16,
                ..
            })
        ));
        assert!(params.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_offset_near_u32_max_rejected() {
        let result = EffectManifest::from_ron(
            r#"(
                name: "Wrap",
                uniform_size: 16,
                parameters: [(name: "xAmbient", kind: Float, offset: 4294967292)],
                techniques: [],
            )"#,
        );
        assert!(matches!(
            result,
            Err(EffectError::InvalidManifest(msg)) if msg.contains("runs past")
        ));
    }

    #[test]
    fn test_missing_entry_point_fails_at_load() {
        let manifest = MANIFEST.replace("vs_main", "vs_missing");
        assert!(matches!(
            Effect::from_sources(&manifest, SHADER),
            Err(EffectError::ShaderBindingMissing {
                what: "vertex entry point",
                ref name,
                ..
            }) if name == "vs_missing"
        ));
    }

    #[test]
    fn test_entry_point_with_wrong_stage_rejected() {
        let manifest = MANIFEST.replace(
            "fragment_entry: \"fs_main\"",
            "fragment_entry: \"vs_main\"",
        );
        assert!(matches!(
            Effect::from_sources(&manifest, SHADER),
            Err(EffectError::ShaderBindingMissing {
                what: "fragment entry point",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_wgsl_is_shader_error() {
        let err = Effect::from_sources(MANIFEST, "fn vs_main( {").unwrap_err();
        assert!(matches!(err, EffectError::Shader { ref effect, .. } if effect == "Test"));
    }

    #[test]
    fn test_misaligned_parameter_rejected() {
        let manifest = manifest_with(vec![decl("m", ParameterKind::Matrix, 4)], 80);
        assert!(matches!(
            manifest.validate(),
            Err(EffectError::InvalidManifest(msg)) if msg.contains("aligned")
        ));
    }

    #[test]
    fn test_parameter_past_block_rejected() {
        let manifest = manifest_with(vec![decl("v", ParameterKind::Vector3, 16)], 16);
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_overlap_rejected() {
        let manifest = manifest_with(
            vec![
                decl("a", ParameterKind::Matrix, 0),
                decl("b", ParameterKind::Float, 60),
            ],
            80,
        );
        assert!(matches!(
            manifest.validate(),
            Err(EffectError::InvalidManifest(msg)) if msg.contains("overlaps")
        ));
    }

    #[test]
    fn test_float_packs_after_vector3() {
        let manifest = manifest_with(
            vec![
                decl("dir", ParameterKind::Vector3, 0),
                decl("amb", ParameterKind::Float, 12),
            ],
            16,
        );
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let manifest = manifest_with(
            vec![
                decl("a", ParameterKind::Float, 0),
                decl("a", ParameterKind::Float, 4),
            ],
            16,
        );
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_empty_technique_rejected() {
        let mut manifest = manifest_with(vec![], 16);
        manifest.techniques.push(TechniqueDecl {
            name: "Empty".into(),
            passes: vec![],
        });
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_bad_uniform_size_rejected() {
        assert!(manifest_with(vec![], 20).validate().is_err());
        assert!(manifest_with(vec![], 0).validate().is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("test.effect.ron");
        let shader = dir.path().join("test.wgsl");
        std::fs::write(&manifest, MANIFEST).unwrap();
        std::fs::write(&shader, SHADER).unwrap();

        let effect = Effect::load(&manifest, &shader).unwrap();
        assert_eq!(effect.source(), SHADER);

        let missing = Effect::load(&dir.path().join("nope.ron"), &shader);
        assert!(matches!(missing, Err(EffectError::Io { .. })));
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        assert!(matches!(
            EffectManifest::from_ron("(name: "),
            Err(EffectError::Parse(_))
        ));
    }
}
