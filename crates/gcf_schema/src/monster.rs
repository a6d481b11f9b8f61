//! Rows of the monster table

use gcf_binary::descriptor::{BinaryRecord, FieldSpec, Presence, Schema};
use gcf_binary::error::Result;
use gcf_binary::Record;

/// Chance of a monster dropping an item when killed
#[derive(Debug, Clone, PartialEq)]
pub struct MonsterDrop {
    pub item_id: u32,
    /// Between 0 and 1
    pub rate: f32,
    pub quantity: u16,
}

impl BinaryRecord for MonsterDrop {
    fn schema() -> Schema {
        Schema::new("MonsterDrop")
            .field("item_id", FieldSpec::u32())
            .field("rate", FieldSpec::f32())
            .field("quantity", FieldSpec::u16())
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            item_id: record.take("item_id")?,
            rate: record.take("rate")?,
            quantity: record.take("quantity")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("item_id", self.item_id)
            .with("rate", self.rate)
            .with("quantity", self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Monster {
    pub id: u32,
    pub name: String,
    pub level: u16,
    pub hp: u32,
    pub attack: u16,
    pub defense: u16,
    pub speed: f32,
    /// Non zero for bosses, which carry a title
    pub boss: u8,
    pub title: Option<String>,
    pub drop_count: u8,
    pub drops: Vec<MonsterDrop>,
}

impl BinaryRecord for Monster {
    fn schema() -> Schema {
        Schema::new("Monster")
            .field("id", FieldSpec::u32())
            .field("name", FieldSpec::string().fixed_length(32))
            .field("level", FieldSpec::u16())
            .field("hp", FieldSpec::u32())
            .field("attack", FieldSpec::u16())
            .field("defense", FieldSpec::u16())
            .field("speed", FieldSpec::f32())
            .field("boss", FieldSpec::u8())
            .field(
                "title",
                FieldSpec::string()
                    .fixed_length(24)
                    .present_if(Presence::NonZero("boss".into())),
            )
            .field("drop_count", FieldSpec::u8())
            .field(
                "drops",
                FieldSpec::sequence(FieldSpec::record::<MonsterDrop>()).count_field("drop_count"),
            )
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            id: record.take("id")?,
            name: record.take("name")?,
            level: record.take("level")?,
            hp: record.take("hp")?,
            attack: record.take("attack")?,
            defense: record.take("defense")?,
            speed: record.take("speed")?,
            boss: record.take("boss")?,
            title: record.take("title")?,
            drop_count: record.take("drop_count")?,
            drops: record.take_records("drops")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("level", self.level)
            .with("hp", self.hp)
            .with("attack", self.attack)
            .with("defense", self.defense)
            .with("speed", self.speed)
            .with("boss", self.boss)
            .with("title", self.title.clone())
            .with("drop_count", self.drop_count)
            .with(
                "drops",
                self.drops.iter().map(MonsterDrop::to_record).collect::<Vec<_>>(),
            )
    }
}
