use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scribe_collab::presence::{PresenceColor, PresenceEntry, PresenceMessage, PresenceRoom};
use scribe_collab::shared::SharedDoc;
use uuid::Uuid;

fn sample_entry() -> PresenceEntry {
    let id = Uuid::new_v4();
    PresenceEntry {
        connection_id: id,
        name: "Benchmark Peer".into(),
        avatar: "https://avatars.test/peer.png".into(),
        color: Some(PresenceColor::from_uuid(id)),
    }
}

fn bench_presence_encode(c: &mut Criterion) {
    let msg = PresenceMessage::Join {
        entry: sample_entry(),
    };
    c.bench_function("presence_join_encode", |b| {
        b.iter(|| black_box(black_box(&msg).encode().unwrap()))
    });
}

fn bench_presence_decode(c: &mut Criterion) {
    let msg = PresenceMessage::Join {
        entry: sample_entry(),
    };
    let encoded = msg.encode().unwrap();
    c.bench_function("presence_join_decode", |b| {
        b.iter(|| black_box(PresenceMessage::decode(black_box(&encoded)).unwrap()))
    });
}

fn bench_room_join_100_peers(c: &mut Criterion) {
    c.bench_function("presence_room_join_100", |b| {
        b.iter(|| {
            let mut room = PresenceRoom::new(Uuid::new_v4());
            for _ in 0..100 {
                room.handle_message(&PresenceMessage::Join {
                    entry: sample_entry(),
                });
            }
            black_box(room.peer_count())
        })
    });
}

fn bench_margin_write_delta(c: &mut Criterion) {
    let doc = SharedDoc::new();
    c.bench_function("margin_write_delta", |b| {
        b.iter(|| black_box(doc.set_left_margin(black_box(72.0))))
    });
}

fn bench_margin_delta_apply(c: &mut Criterion) {
    let source = SharedDoc::new();
    let delta = source.set_left_margin(72.0);
    c.bench_function("margin_delta_apply", |b| {
        b.iter(|| {
            let sink = SharedDoc::new();
            sink.apply_update(black_box(&delta)).unwrap();
            black_box(sink.left_margin())
        })
    });
}

criterion_group!(
    benches,
    bench_presence_encode,
    bench_presence_decode,
    bench_room_join_100_peers,
    bench_margin_write_delta,
    bench_margin_delta_apply
);
criterion_main!(benches);
