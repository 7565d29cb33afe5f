//! Aggregation Benchmarks
//!
//! Measures a full per-person aggregation pass over synthetic review data
//! and the cost of decoding the current data file format.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use gerritstats::filter::CommitFilter;
use gerritstats::model::{Approval, Commit, Identity, PatchSet, PatchSetComment, STATUS_MERGED, STATUS_NEW};
use gerritstats::parser::parse_json_data;
use gerritstats::perperson::PerPersonDataProcessor;
use gerritstats::processor::QueryData;

const CONTRIBUTORS: usize = 40;
const DAY_MILLIS: i64 = 86_400_000;

fn contributor(index: usize) -> Identity {
    Identity::from_email(format!("dev{}@example.com", index % CONTRIBUTORS))
}

/// Changes with three patch sets each, reviewed by the next two contributors
fn create_commits(count: usize) -> Vec<Commit> {
    (0..count)
        .map(|i| {
            let owner = contributor(i);
            let reviewer = contributor(i + 1);
            let second_reviewer = contributor(i + 2);
            let created_on = 1_420_070_400_000 + (i as i64) * DAY_MILLIS / 4;

            let patch_sets = (1..=3)
                .map(|number| PatchSet {
                    number,
                    author: owner.clone(),
                    uploader: owner.clone(),
                    created_on: created_on + number as i64 * 3_600_000,
                    approvals: vec![Approval {
                        approval_type: Approval::TYPE_CODE_REVIEW.to_string(),
                        value: if number == 3 { 2 } else { -1 },
                        granted_by: reviewer.clone(),
                        granted_on: created_on + number as i64 * 7_200_000,
                        ..Approval::default()
                    }],
                    comments: vec![PatchSetComment {
                        file: format!("src/module_{}.rs", number),
                        line: number * 10,
                        reviewer: second_reviewer.clone(),
                        message: "Consider a helper here".to_string(),
                        timestamp: created_on,
                    }],
                    ..PatchSet::default()
                })
                .collect();

            Commit {
                project: "platform".to_string(),
                branch: "master".to_string(),
                commit_number: i as u32,
                owner,
                url: format!("https://review.example.com/{}", i),
                created_on,
                last_updated: created_on + DAY_MILLIS,
                status: (if i % 5 == 0 { STATUS_NEW } else { STATUS_MERGED }).to_string(),
                reviewers: vec![reviewer, second_reviewer],
                patch_sets,
                ..Commit::default()
            }
        })
        .collect()
}

fn create_document(count: usize) -> String {
    let commits: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"project":"platform","branch":"master","number":{i},"status":"MERGED",
                "owner":{{"email":"dev{o}@example.com"}},"createdOn":{t},"lastUpdated":{t},
                "patchSets":[{{"number":1,"uploader":{{"email":"dev{o}@example.com"}},"createdOn":{t},
                "kind":"REWORK","approvals":[{{"type":"Code-Review","value":"2","grantedOn":{t},
                "by":{{"email":"dev{r}@example.com"}}}}]}}]}}"#,
                i = i,
                o = i % CONTRIBUTORS,
                r = (i + 1) % CONTRIBUTORS,
                t = 1_420_070_400 + i * 3_600
            )
        })
        .collect();
    format!(
        r#"{{"gerritStatsVersion":3,"gerritVersion":"2.11.4","commits":[{}]}}"#,
        commits.join(",")
    )
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    for count in [100, 1_000, 10_000] {
        let query = QueryData::new(create_commits(count));
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("commits", count), &query, |b, query| {
            let mut processor = PerPersonDataProcessor::new(CommitFilter::new());
            b.iter(|| {
                let data = processor.aggregate(black_box(query)).unwrap();
                black_box(data.len());
            });
        });
    }
    group.finish();
}

fn bench_filtered_aggregation(c: &mut Criterion) {
    let query = QueryData::new(create_commits(1_000));
    let included: Vec<String> = (0..CONTRIBUTORS / 2)
        .map(|i| format!("dev{}@example.com", i))
        .collect();

    c.bench_function("aggregation_with_include_list", |b| {
        let mut processor = PerPersonDataProcessor::new(CommitFilter::new().with_included_emails(included.clone()));
        b.iter(|| black_box(processor.aggregate(black_box(&query)).unwrap().len()));
    });
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    for count in [100, 1_000] {
        let document = create_document(count);
        group.throughput(Throughput::Bytes(document.len() as u64));
        group.bench_with_input(BenchmarkId::new("current_format", count), &document, |b, document| {
            b.iter(|| black_box(parse_json_data(black_box(document)).commits.len()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_aggregation, bench_filtered_aggregation, bench_parsing);
criterion_main!(benches);
