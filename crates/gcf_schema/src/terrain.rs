//! Terrain patches, one square of the height map plus the objects placed on it

use gcf_binary::descriptor::{BinaryRecord, FieldSpec, Schema};
use gcf_binary::error::Result;
use gcf_binary::Record;

/// Height samples along each side of a patch
pub const PATCH_SIZE: usize = 17;

/// Texture layers blended on a patch
pub const TEXTURE_LAYERS: usize = 4;

/// A model placed on the terrain
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainObject {
    pub model_id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Rotation around the up axis, in radians
    pub rotation: f32,
    pub scale: f32,
}

impl BinaryRecord for TerrainObject {
    fn schema() -> Schema {
        Schema::new("TerrainObject")
            .field("model_id", FieldSpec::u32())
            .field("x", FieldSpec::f32())
            .field("y", FieldSpec::f32())
            .field("z", FieldSpec::f32())
            .field("rotation", FieldSpec::f32())
            .field("scale", FieldSpec::f32())
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            model_id: record.take("model_id")?,
            x: record.take("x")?,
            y: record.take("y")?,
            z: record.take("z")?,
            rotation: record.take("rotation")?,
            scale: record.take("scale")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("model_id", self.model_id)
            .with("x", self.x)
            .with("y", self.y)
            .with("z", self.z)
            .with("rotation", self.rotation)
            .with("scale", self.scale)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainPatch {
    pub x: i32,
    pub y: i32,
    /// Row major, [`PATCH_SIZE`] squared samples
    pub heights: Vec<f32>,
    pub textures: Vec<u16>,
    /// Everything up to the end of the file
    pub objects: Vec<TerrainObject>,
}

impl TerrainPatch {
    /// A flat patch at `height` with no objects
    pub fn flat(x: i32, y: i32, height: f32) -> Self {
        Self {
            x,
            y,
            heights: vec![height; PATCH_SIZE * PATCH_SIZE],
            textures: vec![0; TEXTURE_LAYERS],
            objects: Vec::new(),
        }
    }

    pub fn height(&self, column: usize, row: usize) -> Option<f32> {
        if column >= PATCH_SIZE || row >= PATCH_SIZE {
            return None;
        }
        self.heights.get(row * PATCH_SIZE + column).copied()
    }
}

impl BinaryRecord for TerrainPatch {
    fn schema() -> Schema {
        Schema::new("TerrainPatch")
            .field("x", FieldSpec::i32())
            .field("y", FieldSpec::i32())
            .field(
                "heights",
                FieldSpec::sequence(FieldSpec::f32()).count_constant(PATCH_SIZE * PATCH_SIZE),
            )
            .field(
                "textures",
                FieldSpec::sequence(FieldSpec::u16()).count_constant(TEXTURE_LAYERS),
            )
            .field(
                "objects",
                FieldSpec::sequence(FieldSpec::record::<TerrainObject>()).count_remaining(),
            )
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            x: record.take("x")?,
            y: record.take("y")?,
            heights: record.take("heights")?,
            textures: record.take("textures")?,
            objects: record.take_records("objects")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("x", self.x)
            .with("y", self.y)
            .with("heights", self.heights.clone())
            .with("textures", self.textures.clone())
            .with(
                "objects",
                self.objects
                    .iter()
                    .map(TerrainObject::to_record)
                    .collect::<Vec<_>>(),
            )
    }
}
