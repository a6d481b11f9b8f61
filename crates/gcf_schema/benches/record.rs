use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn item_table(len: u32) -> gcf_schema::item_table::ItemTable {
    use gcf_schema::item_table::{ItemEntry, ItemTable};

    ItemTable::new(
        1,
        (0..len)
            .map(|id| ItemEntry {
                id,
                name: format!("Item {id}"),
                kind: 0,
                level: 1,
                price: 10,
                max_stack: 99,
            })
            .collect(),
    )
    .unwrap()
}

pub mod read {
    use divan::Bencher;
    use gcf_binary::{read_record, write_record};
    use gcf_schema::item_table::ItemTable;
    use gcf_schema::terrain::TerrainPatch;

    #[divan::bench(args = [10, 1000])]
    fn item_table(bencher: Bencher, len: u32) {
        bencher
            .with_inputs(|| write_record(&super::item_table(len)).unwrap())
            .bench_refs(|data| {
                divan::black_box(read_record::<ItemTable>(data).unwrap());
            });
    }

    #[divan::bench]
    fn terrain_patch(bencher: Bencher) {
        bencher
            .with_inputs(|| write_record(&TerrainPatch::flat(0, 0, 1.0)).unwrap())
            .bench_refs(|data| {
                divan::black_box(read_record::<TerrainPatch>(data).unwrap());
            });
    }
}

pub mod write {
    use divan::Bencher;
    use gcf_binary::write_record;
    use gcf_schema::terrain::TerrainPatch;

    #[divan::bench(args = [10, 1000])]
    fn item_table(bencher: Bencher, len: u32) {
        bencher
            .with_inputs(|| super::item_table(len))
            .bench_refs(|table| {
                divan::black_box(write_record(&*table).unwrap());
            });
    }

    #[divan::bench]
    fn terrain_patch(bencher: Bencher) {
        let patch = TerrainPatch::flat(0, 0, 1.0);
        bencher.bench_local(move || {
            divan::black_box(write_record(&patch).unwrap());
        });
    }
}
