use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};

use isoprop_core::loading::codec::write_i32_stream;
use isoprop_core::prelude::*;

const SIZE: usize = 200;
const N_MINUTES: usize = 120;
const N_STOPS: usize = 400;
const STOPS_PER_PIXEL: usize = 6;

/// Every pixel reaches a handful of stops near its column
fn stop_trees() -> Vec<u8> {
    let (mut prev_stop, mut prev_time) = (0i32, 0i32);
    let mut ints = Vec::new();
    for y in 0..SIZE {
        for x in 0..SIZE {
            ints.push(STOPS_PER_PIXEL as i32);
            for k in 0..STOPS_PER_PIXEL {
                let stop = ((x + y + k * 37) % N_STOPS) as i32;
                let time = (60 + k * 90 + (x % 7) * 11) as i32;
                ints.extend([stop - prev_stop, time - prev_time]);
                prev_stop = stop;
                prev_time = time;
            }
        }
    }
    write_i32_stream(&ints)
}

fn origin() -> Vec<u8> {
    let radius = 10;
    let diameter = radius * 2 + 1;
    let mut ints = vec![radius as i32];
    ints.extend(std::iter::repeat_n(0, diameter * diameter));
    ints.extend([N_STOPS as i32, N_MINUTES as i32]);

    for stop in 0..N_STOPS as i32 {
        ints.extend([900 + stop * 13, 300, 120, 0]);
        for minute in 1..N_MINUTES as i32 {
            let travel = if minute % 10 == 0 { 270 } else { -30 };
            let path = if minute % 2 == 1 { 1 } else { -1 };
            ints.extend([travel, 0, 0, path]);
        }
        ints.extend([2, 1, stop, 3, 0, 2, stop, 4, 1, 1, 5, 0]);
    }
    write_i32_stream(&ints)
}

fn session() -> Session {
    let extent = Extent {
        zoom: 10,
        west: 5000,
        north: 6000,
        width: SIZE,
        height: SIZE,
    };
    let grid =
        Grid::new(extent, (0..SIZE * SIZE).map(|i| (i % 97) as f64).collect()).expect("valid grid");

    SessionBuilder::new()
        .with_query(Query::new(extent))
        .with_stop_trees(&stop_trees())
        .expect("valid stop trees")
        .with_grid("jobs", Arc::new(grid))
        .expect("matching grid")
        .with_origin(
            Origin::from_bytes(&origin(), PixelPoint::new(100, 100)).expect("valid origin"),
        )
        .build()
        .expect("complete session")
}

fn bench_surface(c: &mut Criterion) {
    let session = session();
    let cancel = CancellationToken::new();

    let mut group = c.benchmark_group("generate_surface");
    group.sample_size(10);
    for which in [Case::Average, Case::Median] {
        let options = SurfaceOptions {
            which,
            spectrogram_grid: Some("jobs".to_string()),
            ..SurfaceOptions::default()
        };
        group.bench_function(which.as_str(), |b| {
            b.iter(|| generate_surface(black_box(&session), &options, &cancel))
        });
    }
    group.finish();
}

fn bench_paths(c: &mut Criterion) {
    let session = session();
    c.bench_function("paths_and_times", |b| {
        b.iter(|| paths_and_times(black_box(&session), PixelPoint::new(150, 40)))
    });
}

criterion_group!(benches, bench_surface, bench_paths);
criterion_main!(benches);
