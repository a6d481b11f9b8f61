//! Record declarations for the binary files shipped with the game client
//!
//! Every type in this crate is a plain data declaration: it names its fields in wire order,
//! says how each one is encoded and converts to and from a [`gcf_binary::Record`]. Reading and
//! writing is left entirely to [`gcf_binary`].
//!
//! | Type                                 | File                      | Layout notes                                    |
//! |--------------------------------------|---------------------------|-------------------------------------------------|
//! | [`cash::CashItem`]                   | `cashshop.bin` entries    | length prefixed names, bonuses counted by a u8  |
//! | [`monster::Monster`]                 | `monster.bin` rows        | fixed names, drops counted by a u8, boss title  |
//! | [`item_table::ItemTable`]            | `item.tbl`                | u32 entry count followed by the entries         |
//! | [`terrain::TerrainPatch`]            | `*.ter` patches           | 17x17 height grid, objects until end of file    |
//! | [`model::Model`]                     | `*.gmd` headers           | magic, null terminated name, UTF-16 label       |
//!
//! ```
//! use gcf_binary::{read_record, write_record};
//! use gcf_schema::cash::{CashCategory, CashItem};
//!
//! let item = CashItem {
//!     id: 42,
//!     name: "Potion".into(),
//!     description: "Restores 500 HP".into(),
//!     price: 150,
//!     category: CashCategory::Consumable as u8,
//!     icon: "icon_potion".into(),
//!     bonus_count: 0,
//!     bonuses: Vec::new(),
//! };
//!
//! let bytes = write_record(&item).unwrap();
//! assert_eq!(read_record::<CashItem>(&bytes).unwrap(), item);
//! ```

pub mod cash;
pub mod item_table;
pub mod model;
pub mod monster;
pub mod terrain;
