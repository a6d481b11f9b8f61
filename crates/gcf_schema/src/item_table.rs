//! The item table, a counted list of item definitions

use gcf_binary::descriptor::{BinaryRecord, FieldSpec, PrefixWidth, Schema};
use gcf_binary::error::{Result, SchemaError};
use gcf_binary::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEntry {
    pub id: u32,
    pub name: String,
    pub kind: u8,
    pub level: u16,
    pub price: u32,
    pub max_stack: u16,
}

impl BinaryRecord for ItemEntry {
    fn schema() -> Schema {
        Schema::new("ItemEntry")
            .field("id", FieldSpec::u32())
            .field("name", FieldSpec::string().length_prefixed(PrefixWidth::U8))
            .field("kind", FieldSpec::u8())
            .field("level", FieldSpec::u16())
            .field("price", FieldSpec::u32())
            .field("max_stack", FieldSpec::u16())
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            id: record.take("id")?,
            name: record.take("name")?,
            kind: record.take("kind")?,
            level: record.take("level")?,
            price: record.take("price")?,
            max_stack: record.take("max_stack")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("kind", self.kind)
            .with("level", self.level)
            .with("price", self.price)
            .with("max_stack", self.max_stack)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTable {
    pub version: u16,
    pub count: u32,
    pub items: Vec<ItemEntry>,
}

impl ItemTable {
    /// Build a table whose count matches `items`, which must fit the u32 count field
    pub fn new(version: u16, items: Vec<ItemEntry>) -> Result<Self> {
        let count = u32::try_from(items.len()).map_err(|_| SchemaError::InvalidCount {
            field: "count".to_owned(),
            count: items.len().to_string(),
        })?;
        Ok(Self {
            version,
            count,
            items,
        })
    }

    pub fn get(&self, id: u32) -> Option<&ItemEntry> {
        self.items.iter().find(|item| item.id == id)
    }
}

impl BinaryRecord for ItemTable {
    fn schema() -> Schema {
        Schema::new("ItemTable")
            .field("version", FieldSpec::u16())
            .field("count", FieldSpec::u32())
            .field(
                "items",
                FieldSpec::sequence(FieldSpec::record::<ItemEntry>()).count_field("count"),
            )
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            version: record.take("version")?,
            count: record.take("count")?,
            items: record.take_records("items")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("version", self.version)
            .with("count", self.count)
            .with(
                "items",
                self.items.iter().map(ItemEntry::to_record).collect::<Vec<_>>(),
            )
    }
}
