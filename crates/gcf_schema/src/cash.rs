//! Cash shop catalogue entries

use gcf_binary::descriptor::{BinaryRecord, FieldSpec, PrefixWidth, Schema};
use gcf_binary::error::Result;
use gcf_binary::Record;

/// Shop tab an item is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CashCategory {
    Consumable = 0,
    Costume = 1,
    Mount = 2,
    Package = 3,
}

impl TryFrom<u8> for CashCategory {
    type Error = u8;

    fn try_from(value: u8) -> core::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(CashCategory::Consumable),
            1 => Ok(CashCategory::Costume),
            2 => Ok(CashCategory::Mount),
            3 => Ok(CashCategory::Package),
            other => Err(other),
        }
    }
}

/// An item granted on top of the purchased one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashBonus {
    pub item_id: u32,
    pub amount: u16,
}

impl BinaryRecord for CashBonus {
    fn schema() -> Schema {
        Schema::new("CashBonus")
            .field("item_id", FieldSpec::u32())
            .field("amount", FieldSpec::u16())
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            item_id: record.take("item_id")?,
            amount: record.take("amount")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("item_id", self.item_id)
            .with("amount", self.amount)
    }
}

/// One purchasable entry of the cash shop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: u32,
    /// Raw [`CashCategory`] value, unknown categories are kept as they are
    pub category: u8,
    /// Icon resource name, at most 32 bytes
    pub icon: String,
    pub bonus_count: u8,
    pub bonuses: Vec<CashBonus>,
}

impl CashItem {
    pub fn category(&self) -> Option<CashCategory> {
        CashCategory::try_from(self.category).ok()
    }
}

impl BinaryRecord for CashItem {
    fn schema() -> Schema {
        Schema::new("CashItem")
            .field("id", FieldSpec::i64())
            .field("name", FieldSpec::string().length_prefixed(PrefixWidth::U8))
            .field(
                "description",
                FieldSpec::string().length_prefixed(PrefixWidth::U16),
            )
            .field("price", FieldSpec::u32())
            .field("category", FieldSpec::u8())
            .field("icon", FieldSpec::string().fixed_length(32))
            .field("bonus_count", FieldSpec::u8())
            .field(
                "bonuses",
                FieldSpec::sequence(FieldSpec::record::<CashBonus>()).count_field("bonus_count"),
            )
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            id: record.take("id")?,
            name: record.take("name")?,
            description: record.take("description")?,
            price: record.take("price")?,
            category: record.take("category")?,
            icon: record.take("icon")?,
            bonus_count: record.take("bonus_count")?,
            bonuses: record.take_records("bonuses")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("price", self.price)
            .with("category", self.category)
            .with("icon", self.icon.as_str())
            .with("bonus_count", self.bonus_count)
            .with(
                "bonuses",
                self.bonuses.iter().map(CashBonus::to_record).collect::<Vec<_>>(),
            )
    }
}
