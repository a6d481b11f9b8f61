use std::io::Cursor;

use gcf_binary::descriptor::{BinaryRecord, FieldSpec, PrefixWidth, Presence, Schema};
use gcf_binary::error::{Error, Result, SchemaError};
use gcf_binary::{read_record, read_record_from, write_record, Blob, Record, RecordReader};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

#[derive(Debug, Clone, PartialEq)]
struct Potion {
    id: i64,
    name: String,
}

impl BinaryRecord for Potion {
    fn schema() -> Schema {
        Schema::new("Potion")
            .field("id", FieldSpec::i64())
            .field("name", FieldSpec::string().length_prefixed(PrefixWidth::U8))
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            id: record.take("id")?,
            name: record.take("name")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Reward {
    item_id: u32,
    chance: f32,
}

impl BinaryRecord for Reward {
    fn schema() -> Schema {
        Schema::new("Reward")
            .field("item_id", FieldSpec::u32())
            .field("chance", FieldSpec::f32())
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            item_id: record.take("item_id")?,
            chance: record.take("chance")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("item_id", self.item_id)
            .with("chance", self.chance)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Quest {
    code: String,
    title: String,
    flags: u8,
    timer: Option<u16>,
    reward_count: u16,
    rewards: Vec<Reward>,
    checksum: Blob,
    giver: Potion,
    notes: Vec<String>,
}

impl BinaryRecord for Quest {
    fn schema() -> Schema {
        Schema::new("Quest")
            .field("code", FieldSpec::string().fixed_length(8))
            .field("title", FieldSpec::wide_string().null_terminated())
            .field("flags", FieldSpec::u8())
            .field(
                "timer",
                FieldSpec::u16().present_if(Presence::Equals("flags".into(), 2)),
            )
            .field("reward_count", FieldSpec::u16())
            .field(
                "rewards",
                FieldSpec::sequence(FieldSpec::record::<Reward>()).count_field("reward_count"),
            )
            .field("checksum", FieldSpec::blob(4))
            .field("giver", FieldSpec::record::<Potion>())
            .field(
                "notes",
                FieldSpec::sequence(FieldSpec::string().length_prefixed(PrefixWidth::U16))
                    .count_remaining(),
            )
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            code: record.take("code")?,
            title: record.take("title")?,
            flags: record.take("flags")?,
            timer: record.take("timer")?,
            reward_count: record.take("reward_count")?,
            rewards: record.take_records("rewards")?,
            checksum: record.take("checksum")?,
            giver: record.take_record("giver")?,
            notes: record.take("notes")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("code", self.code.as_str())
            .with("title", self.title.as_str())
            .with("flags", self.flags)
            .with("timer", self.timer)
            .with("reward_count", self.reward_count)
            .with(
                "rewards",
                self.rewards.iter().map(Reward::to_record).collect::<Vec<_>>(),
            )
            .with("checksum", self.checksum.clone())
            .with("giver", self.giver.to_record())
            .with("notes", self.notes.clone())
    }
}

fn quest() -> Quest {
    Quest {
        code: "Q0001".into(),
        title: "Ratten im Keller".into(),
        flags: 2,
        timer: Some(600),
        reward_count: 2,
        rewards: vec![
            Reward {
                item_id: 1001,
                chance: 0.25,
            },
            Reward {
                item_id: 1002,
                chance: f32::from_bits(0x7FC0_0001),
            },
        ],
        checksum: Blob::new(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        giver: Potion {
            id: -7,
            name: "Innkeeper".into(),
        },
        notes: vec!["first".into(), String::new(), "third".into()],
    }
}

#[traced_test]
#[test]
fn potion_layout() -> Result<()> {
    #[rustfmt::skip]
    let expected = vec![
        0x2A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x06,
        b'P', b'o', b't', b'i', b'o', b'n',
    ];

    let potion = Potion {
        id: 42,
        name: "Potion".into(),
    };

    let bytes = write_record(&potion)?;
    assert_eq!(bytes, expected);
    assert_eq!(read_record::<Potion>(&expected)?, potion);

    Ok(())
}

#[traced_test]
#[test]
fn quest_round_trip() -> Result<()> {
    let original = quest();
    let bytes = write_record(&original)?;
    let decoded = read_record::<Quest>(&bytes)?;

    // NaN never compares equal, so the payload is checked by its bits.
    assert_eq!(decoded.rewards[1].chance.to_bits(), 0x7FC0_0001);
    let mut expected = original.clone();
    expected.rewards[1].chance = 0.0;
    let mut actual = decoded.clone();
    actual.rewards[1].chance = 0.0;
    assert_eq!(actual, expected);

    assert_eq!(write_record(&decoded)?, bytes);

    Ok(())
}

#[test]
fn quest_without_timer() -> Result<()> {
    let original = Quest {
        flags: 1,
        timer: None,
        reward_count: 0,
        rewards: Vec::new(),
        notes: Vec::new(),
        ..quest()
    };

    let bytes = write_record(&original)?;
    assert_eq!(read_record::<Quest>(&bytes)?, original);

    Ok(())
}

#[test]
fn truncated_input_fails_at_exact_field() -> Result<()> {
    let bytes = write_record(&quest())?;

    // code (8) + title (17 units * 2) + flags (1) + timer (2) + reward_count (2)
    // + first reward (8) + item_id of the second (4), leaving two bytes of its chance
    let cut = 8 + 34 + 1 + 2 + 2 + 8 + 4 + 2;
    let err = read_record::<Quest>(&bytes[..cut]).unwrap_err();

    assert!(err.is_out_of_bounds());
    assert_eq!(err.field(), Some("Quest.rewards[1].chance"));

    Ok(())
}

#[test]
fn reward_count_must_match_rewards() {
    let original = Quest {
        reward_count: 3,
        ..quest()
    };

    let err = write_record(&original).unwrap_err();
    assert!(matches!(
        err,
        Error::Schema(SchemaError::CountMismatch {
            expected: 3,
            actual: 2,
            ..
        })
    ));
}

#[test]
fn fixed_code_too_long() {
    let original = Quest {
        code: "Q000000001".into(),
        ..quest()
    };

    let err = write_record(&original).unwrap_err();
    assert!(err.is_schema());
    assert_eq!(err.field(), Some("Quest.code"));
}

#[test]
fn consecutive_records() -> Result<()> {
    let potions = (0..3)
        .map(|i| Potion {
            id: i,
            name: format!("Potion {i}"),
        })
        .collect::<Vec<_>>();

    let mut bytes = Vec::new();
    for potion in &potions {
        bytes.extend(write_record(potion)?);
    }

    let mut reader = RecordReader::new(bytes.as_slice());
    assert_eq!(reader.read_all::<Potion>()?, potions);

    Ok(())
}

#[test]
fn read_from_byte_source() -> Result<()> {
    let potion = Potion {
        id: 1,
        name: "Elixir".into(),
    };
    let bytes = write_record(&potion)?;

    assert_eq!(read_record_from::<Potion, _>(Cursor::new(bytes))?, potion);

    Ok(())
}

struct Broken;

impl BinaryRecord for Broken {
    fn schema() -> Schema {
        Schema::new("Broken").field("name", FieldSpec::string())
    }

    fn from_record(_: Record) -> Result<Self> {
        Ok(Broken)
    }

    fn to_record(&self) -> Record {
        Record::new().with("name", "x")
    }
}

#[test]
fn incomplete_schema_fails_both_ways() {
    assert!(matches!(
        read_record::<Broken>(&[0x00]),
        Err(Error::Schema(SchemaError::MissingEncoding { .. }))
    ));
    assert!(matches!(
        write_record(&Broken),
        Err(Error::Schema(SchemaError::MissingEncoding { .. }))
    ));
}
