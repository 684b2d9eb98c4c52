use criterion::{criterion_group, criterion_main, Criterion};
use fitvault::models::RecordKind;
use fitvault::normalize::{is_empty_payload, normalize, split_payloads};
use serde_json::{json, Value};
use std::hint::black_box;

fn activity_summary(id: i64) -> Value {
    json!({
        "activityId": id,
        "activityName": "Morning Run",
        "activityType": {"typeKey": "running", "typeId": 1},
        "startTimeGMT": "2024-01-01 06:00:00",
        "startTimeLocal": "2024-01-01 07:00:00",
        "duration": 1800.0,
        "distance": "5000.0",
        "calories": 320,
        "averageHR": 148.0,
        "maxHR": 171.0,
        "averageRunningCadenceInStepsPerMinute": 172.0,
        "elevationGain": 42.0,
        "vO2MaxValue": 51.0
    })
}

fn activity_details(id: i64) -> Value {
    json!({
        "activityId": id,
        "activityName": "Morning Run",
        "activityTypeDTO": {"typeKey": "running"},
        "locationName": "Palo Alto",
        "summaryDTO": {
            "startTimeGMT": "2024-01-01T06:00:00.0",
            "duration": 1800.0,
            "distance": 5000.0,
            "calories": 320.0,
            "averageHR": 148.0,
            "maxHR": null
        }
    })
}

fn benchmark_normalize(c: &mut Criterion) {
    let summary = activity_summary(42);
    let details = activity_details(43);

    // A month of weigh-ins in one range file
    let weights: Vec<Value> = (1..=30)
        .map(|day| {
            json!({
                "calendarDate": format!("2024-01-{day:02}"),
                "date": 1_704_067_200_000i64 + day * 86_400_000,
                "weight": 80.0 - day as f64 * 0.05,
                "bmi": 22.4,
                "bodyFat": 18.5
            })
        })
        .collect();
    let weight_file = json!({ "dateWeightList": weights });

    let mut group = c.benchmark_group("normalize");

    group.bench_function("activity_summary_shape", |b| {
        b.iter(|| normalize(RecordKind::Activity, black_box(&summary)))
    });

    group.bench_function("activity_details_shape", |b| {
        b.iter(|| normalize(RecordKind::Activity, black_box(&details)))
    });

    group.bench_function("weight_range_file", |b| {
        b.iter(|| {
            split_payloads(RecordKind::Weight, black_box(weight_file.clone()))
                .iter()
                .filter(|raw| !is_empty_payload(RecordKind::Weight, raw))
                .map(|raw| normalize(RecordKind::Weight, raw))
                .filter(Result::is_ok)
                .count()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_normalize);
criterion_main!(benches);
