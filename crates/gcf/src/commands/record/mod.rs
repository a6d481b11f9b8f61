pub mod decode;
pub mod describe;
pub mod verify;

use clap::ValueEnum;
use gcf_binary::descriptor::RecordDescriptor;
use gcf_binary::{resolve, BinaryRecord};
use gcf_schema::{
    cash::CashItem, item_table::ItemTable, model::Model, monster::Monster, terrain::TerrainPatch,
};
use std::{fmt::Debug, sync::Arc};

#[derive(clap::Subcommand)]
pub enum RecordCommands {
    /// Decode a file and print its records
    Decode(decode::DecodeArgs),
    /// Check that files survive a decode and re-encode unchanged
    Verify(verify::VerifyArgs),
    /// Print the field layout of a schema
    Describe(describe::DescribeArgs),
}

impl RecordCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            RecordCommands::Decode(decode) => decode.handle(),
            RecordCommands::Verify(verify) => verify.handle(),
            RecordCommands::Describe(describe) => describe.handle(),
        }
    }
}

/// Record layouts known to the tool
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum SchemaName {
    CashItem,
    Monster,
    ItemTable,
    TerrainPatch,
    Model,
}

/// Runs generic code against the record type behind a [`SchemaName`]
pub trait SchemaVisitor {
    type Output;

    fn visit<T: BinaryRecord + Debug>(self) -> Self::Output;
}

impl SchemaName {
    pub fn visit<V: SchemaVisitor>(self, visitor: V) -> V::Output {
        match self {
            SchemaName::CashItem => visitor.visit::<CashItem>(),
            SchemaName::Monster => visitor.visit::<Monster>(),
            SchemaName::ItemTable => visitor.visit::<ItemTable>(),
            SchemaName::TerrainPatch => visitor.visit::<TerrainPatch>(),
            SchemaName::Model => visitor.visit::<Model>(),
        }
    }

    pub fn descriptor(self) -> gcf_binary::error::Result<Arc<RecordDescriptor>> {
        struct Resolve;

        impl SchemaVisitor for Resolve {
            type Output = gcf_binary::error::Result<Arc<RecordDescriptor>>;

            fn visit<T: BinaryRecord + Debug>(self) -> Self::Output {
                resolve::<T>()
            }
        }

        self.visit(Resolve)
    }
}
