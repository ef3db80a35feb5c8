use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use crimson_club::alumni::{HistoricalRoster, build_alumni_candidates};
use crimson_club::fixtures::parse_roster_json;
use crimson_club::merge::merge_by_name;
use crimson_club::models::{MemberProfile, MemberRole, MergedMember, RosterEntry};
use crimson_club::name_key::NameKeyResolver;
use crimson_club::search::{AlumniFilters, apply_search_and_filters};
use uuid::Uuid;

const ROSTER_SIZE: usize = 300;

const HOUSES: [&str; 4] = ["Adams", "Kirkland", "Lowell", "Winthrop"];

fn roster(offset: usize, len: usize) -> Vec<RosterEntry> {
    (offset..offset + len)
        .map(|i| RosterEntry::named(format!("Player {i}")))
        .collect()
}

fn profiles(len: usize) -> Vec<MemberProfile> {
    (0..len)
        .map(|i| {
            let mut p = MemberProfile::new(
                Uuid::new_v4(),
                format!("PLAYER {}", i * 2),
                MemberRole::Alumni,
            );
            p.house = Some(HOUSES[i % HOUSES.len()].to_string());
            p.graduation_year = Some(2017 + (i % 8) as i32);
            p.current_job = Some(if i % 3 == 0 { "Engineer" } else { "Analyst" }.to_string());
            p.hometown = Some("Cambridge".to_string());
            p
        })
        .collect()
}

fn bench_roster_parse(c: &mut Criterion) {
    let raw = serde_json::json!({
        "players": roster(0, ROSTER_SIZE)
            .iter()
            .map(|e| serde_json::json!({ "name": e.name, "position": "Midfielder", "number": 8 }))
            .collect::<Vec<_>>()
    })
    .to_string();
    c.bench_function("roster_parse", |b| {
        b.iter(|| {
            let rows = parse_roster_json(black_box(&raw)).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_merge(c: &mut Criterion) {
    let records = roster(0, ROSTER_SIZE);
    let profiles = profiles(ROSTER_SIZE);
    c.bench_function("merge_roster_with_profiles", |b| {
        b.iter(|| {
            let merged = merge_by_name(black_box(&records), black_box(&profiles));
            black_box(merged.len());
        })
    });
}

fn bench_alumni_candidates(c: &mut Criterion) {
    let current = roster(0, 30);
    let historical = (0..8)
        .map(|year| HistoricalRoster {
            season: (2017 + year).to_string(),
            players: roster(year * 25, ROSTER_SIZE / 8 + 25),
            loaded: true,
        })
        .collect::<Vec<_>>();
    c.bench_function("alumni_candidates", |b| {
        b.iter(|| {
            let out = build_alumni_candidates(
                black_box(&current),
                black_box(&historical),
                &NameKeyResolver,
            );
            black_box(out.len());
        })
    });
}

fn bench_search(c: &mut Criterion) {
    let merged: Vec<MergedMember> = merge_by_name(&roster(0, ROSTER_SIZE * 2), &profiles(ROSTER_SIZE));
    let filters = AlumniFilters {
        house: "Kirkland".to_string(),
        graduation_year: "2020".to_string(),
        ..AlumniFilters::default()
    };
    c.bench_function("search_and_filter", |b| {
        b.iter(|| {
            let hits = apply_search_and_filters(black_box(&merged), "engineer", &filters);
            black_box(hits.len());
        })
    });
}

criterion_group!(
    benches,
    bench_roster_parse,
    bench_merge,
    bench_alumni_candidates,
    bench_search
);
criterion_main!(benches);
