//! Model file headers with their vertex and index buffers

use gcf_binary::descriptor::{BinaryRecord, FieldSpec, PrefixWidth, Schema};
use gcf_binary::error::Result;
use gcf_binary::Record;

/// Magic at the start of every model file
pub const MODEL_MAGIC: &str = "GMDL";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl BinaryRecord for Vec3 {
    fn schema() -> Schema {
        Schema::new("Vec3")
            .field("x", FieldSpec::f32())
            .field("y", FieldSpec::f32())
            .field("z", FieldSpec::f32())
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            x: record.take("x")?,
            y: record.take("y")?,
            z: record.take("z")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("x", self.x)
            .with("y", self.y)
            .with("z", self.z)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub u: f32,
    pub v: f32,
}

impl BinaryRecord for Vertex {
    fn schema() -> Schema {
        Schema::new("Vertex")
            .field("position", FieldSpec::record::<Vec3>())
            .field("normal", FieldSpec::record::<Vec3>())
            .field("u", FieldSpec::f32())
            .field("v", FieldSpec::f32())
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            position: record.take_record("position")?,
            normal: record.take_record("normal")?,
            u: record.take("u")?,
            v: record.take("v")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("position", self.position.to_record())
            .with("normal", self.normal.to_record())
            .with("u", self.u)
            .with("v", self.v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Always [`MODEL_MAGIC`] for files written by the client
    pub magic: String,
    pub version: u32,
    pub name: String,
    /// Display name, stored as UTF-16
    pub label: String,
    pub vertex_count: u32,
    pub vertices: Vec<Vertex>,
    pub index_count: u32,
    pub indices: Vec<u16>,
}

impl Model {
    pub fn has_magic(&self) -> bool {
        self.magic == MODEL_MAGIC
    }

    /// Number of whole triangles described by the index buffer
    pub fn triangles(&self) -> usize {
        self.indices.len() / 3
    }
}

impl BinaryRecord for Model {
    fn schema() -> Schema {
        Schema::new("Model")
            .field("magic", FieldSpec::string().fixed_length(4))
            .field("version", FieldSpec::u32())
            .field("name", FieldSpec::string().null_terminated())
            .field(
                "label",
                FieldSpec::wide_string().length_prefixed(PrefixWidth::U16),
            )
            .field("vertex_count", FieldSpec::u32())
            .field(
                "vertices",
                FieldSpec::sequence(FieldSpec::record::<Vertex>()).count_field("vertex_count"),
            )
            .field("index_count", FieldSpec::u32())
            .field(
                "indices",
                FieldSpec::sequence(FieldSpec::u16()).count_field("index_count"),
            )
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            magic: record.take("magic")?,
            version: record.take("version")?,
            name: record.take("name")?,
            label: record.take("label")?,
            vertex_count: record.take("vertex_count")?,
            vertices: record.take_records("vertices")?,
            index_count: record.take("index_count")?,
            indices: record.take("indices")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("magic", self.magic.as_str())
            .with("version", self.version)
            .with("name", self.name.as_str())
            .with("label", self.label.as_str())
            .with("vertex_count", self.vertex_count)
            .with(
                "vertices",
                self.vertices.iter().map(Vertex::to_record).collect::<Vec<_>>(),
            )
            .with("index_count", self.index_count)
            .with("indices", self.indices.clone())
    }
}
