//! Review data decoding
//!
//! Reads the JSON files written by the downloader into the review model.
//! Two layouts are understood: the current one, a single object holding
//! `gerritStatsVersion`, `gerritVersion` and a `commits` array, and the
//! legacy one with one JSON object per line.
//!
//! Every missing or null field decodes to an empty value here so that the
//! aggregation code never has to deal with absent data. Timestamps arrive
//! as epoch seconds and are stored as epoch milliseconds.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Result, StatsError};
use crate::model::{
    Approval, ChangeComment, Commit, GerritVersion, Identity, PatchSet, PatchSetComment, PatchSetKind,
};
use crate::processor::QueryData;

include!(concat!(env!("OUT_DIR"), "/data_format_version.rs"));

const SEC_TO_MSEC: i64 = 1000;

/// Decoded content of one data file
#[derive(Debug, Clone, Default)]
pub struct GerritData {
    pub version: GerritVersion,
    pub commits: Vec<Commit>,
}

/// Decode the content of a data file.
///
/// Never fails: unreadable legacy lines and undecodable commits are logged
/// and skipped.
pub fn parse_json_data(data: &str) -> GerritData {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(root)) => {
            let format_version = root.get("gerritStatsVersion").map_or(0, lenient_i64_value);
            if format_version == 0 {
                parse_legacy_format_data(data)
            } else {
                parse_json_object(format_version, &root)
            }
        }
        _ => parse_legacy_format_data(data),
    }
}

/// Read and decode a data file
pub fn parse_file(path: &Path) -> Result<GerritData> {
    let data = fs::read_to_string(path)?;
    log::info!("Parsing {}", path.display());
    Ok(parse_json_data(&data))
}

/// Read all `paths` into one query data set.
///
/// Commits keep file order and input order within each file. The reported
/// Gerrit version is the oldest valid version across the files.
pub fn load_query_data(paths: &[PathBuf], branches: &[String]) -> Result<QueryData> {
    if paths.is_empty() {
        return Err(StatsError::parse("No data files given"));
    }

    let mut commits = Vec::new();
    let mut version = GerritVersion::invalid();
    for path in paths {
        let data = parse_file(path).map_err(|e| match e {
            StatsError::Io(io) => StatsError::parse(format!("Cannot read {}: {}", path.display(), io)),
            other => other,
        })?;
        log::debug!("{}: {} commits, Gerrit version {}", path.display(), data.commits.len(), data.version);
        version = version.min_valid(data.version);
        commits.extend(data.commits);
    }

    log::info!("Loaded {} commits from {} file(s)", commits.len(), paths.len());
    Ok(QueryData::new(commits)
        .with_filenames(paths.iter().map(|p| p.display().to_string()).collect())
        .with_branches(branches.to_vec())
        .with_gerrit_version(version))
}

fn parse_json_object(format_version: i64, root: &serde_json::Map<String, Value>) -> GerritData {
    if format_version > SUPPORTED_DATA_FORMAT_VERSION {
        log::warn!(
            "Data format version {} is newer than the supported version {}; parsing best-effort",
            format_version,
            SUPPORTED_DATA_FORMAT_VERSION
        );
    }

    let version = root
        .get("gerritVersion")
        .and_then(Value::as_str)
        .map(GerritVersion::parse)
        .unwrap_or_default();

    let commits = root
        .get("commits")
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(|value| decode_commit(value, &version)).collect())
        .unwrap_or_default();

    GerritData { version, commits }
}

fn parse_legacy_format_data(data: &str) -> GerritData {
    log::warn!("Using the legacy line-by-line parser; rerun the downloader to use the current format");

    let version = GerritVersion::invalid();
    let mut commits = Vec::new();
    for line in data.lines().filter(|line| !line.trim().is_empty()) {
        match serde_json::from_str::<Value>(line) {
            Ok(value @ Value::Object(_)) => {
                if is_commit(&value) {
                    commits.extend(decode_commit(&value, &version));
                } else if value.get("type").and_then(Value::as_str) != Some("stats") {
                    log::warn!("Ignored line {}", line);
                }
            }
            _ => log::warn!("Not a JSON object: '{}'", line),
        }
    }
    GerritData { version, commits }
}

/// An object is a change record iff it carries a status
fn is_commit(value: &Value) -> bool {
    value.get("status").is_some()
}

fn decode_commit(value: &Value, version: &GerritVersion) -> Option<Commit> {
    if !is_commit(value) {
        return None;
    }
    match RawCommit::deserialize(value) {
        Ok(raw) => Some(raw.into_commit(version)),
        Err(e) => {
            log::warn!("Skipping undecodable change record: {}", e);
            None
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawIdentity {
    name: Option<String>,
    email: Option<String>,
    username: Option<String>,
}

impl From<RawIdentity> for Identity {
    fn from(raw: RawIdentity) -> Self {
        Identity::new(raw.name, raw.email, raw.username)
    }
}

fn identity(raw: Option<RawIdentity>) -> Identity {
    raw.map(Identity::from).unwrap_or_default()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawApproval {
    #[serde(rename = "type")]
    approval_type: Option<String>,
    description: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    value: i64,
    #[serde(deserialize_with = "lenient_i64")]
    granted_on: i64,
    by: Option<RawIdentity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPatchSetComment {
    file: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    line: i64,
    reviewer: Option<RawIdentity>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawChangeComment {
    #[serde(deserialize_with = "lenient_i64")]
    timestamp: i64,
    reviewer: Option<RawIdentity>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawPatchSet {
    #[serde(deserialize_with = "lenient_i64")]
    number: i64,
    revision: Option<String>,
    parents: Option<Vec<String>>,
    #[serde(rename = "ref")]
    ref_name: Option<String>,
    uploader: Option<RawIdentity>,
    author: Option<RawIdentity>,
    #[serde(deserialize_with = "lenient_i64")]
    created_on: i64,
    is_draft: Option<bool>,
    kind: Option<String>,
    approvals: Option<Vec<RawApproval>>,
    comments: Option<Vec<RawPatchSetComment>>,
    #[serde(deserialize_with = "lenient_i64")]
    size_insertions: i64,
    #[serde(deserialize_with = "lenient_i64")]
    size_deletions: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawCommit {
    project: Option<String>,
    branch: Option<String>,
    id: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    number: i64,
    subject: Option<String>,
    owner: Option<RawIdentity>,
    url: Option<String>,
    commit_message: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    created_on: i64,
    #[serde(deserialize_with = "lenient_i64")]
    last_updated: i64,
    open: Option<bool>,
    status: Option<String>,
    all_reviewers: Option<Vec<RawIdentity>>,
    comments: Option<Vec<RawChangeComment>>,
    patch_sets: Option<Vec<RawPatchSet>>,
}

impl RawCommit {
    fn into_commit(self, version: &GerritVersion) -> Commit {
        Commit {
            project: self.project.unwrap_or_default(),
            branch: self.branch.unwrap_or_default(),
            id: self.id.unwrap_or_default(),
            commit_number: to_u32(self.number),
            subject: self.subject.unwrap_or_default(),
            owner: identity(self.owner),
            url: self.url.unwrap_or_default(),
            commit_message: self.commit_message.unwrap_or_default(),
            created_on: seconds_to_millis(self.created_on),
            last_updated: seconds_to_millis(self.last_updated),
            is_open: self.open.unwrap_or(false),
            status: self.status.unwrap_or_default(),
            reviewers: self
                .all_reviewers
                .unwrap_or_default()
                .into_iter()
                .map(Identity::from)
                .collect(),
            comments: self
                .comments
                .unwrap_or_default()
                .into_iter()
                .map(|raw| ChangeComment {
                    timestamp: seconds_to_millis(raw.timestamp),
                    reviewer: identity(raw.reviewer),
                    message: raw.message.unwrap_or_default(),
                })
                .collect(),
            patch_sets: self
                .patch_sets
                .unwrap_or_default()
                .into_iter()
                .map(|raw| raw.into_patch_set(version))
                .collect(),
        }
    }
}

impl RawPatchSet {
    fn into_patch_set(self, version: &GerritVersion) -> PatchSet {
        let created_on = seconds_to_millis(self.created_on);
        let uploader = identity(self.uploader);
        let author = self.author.map(Identity::from).unwrap_or_else(|| uploader.clone());

        PatchSet {
            number: to_u32(self.number),
            revision: self.revision.unwrap_or_default(),
            parents: self.parents.unwrap_or_default(),
            ref_name: self.ref_name.unwrap_or_default(),
            uploader,
            author,
            created_on,
            is_draft: self.is_draft.unwrap_or(false),
            kind: patch_set_kind(self.kind.as_deref(), version),
            approvals: self
                .approvals
                .unwrap_or_default()
                .into_iter()
                .map(|raw| Approval {
                    approval_type: raw.approval_type.unwrap_or_default(),
                    description: raw.description.unwrap_or_default(),
                    value: raw.value.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
                    granted_on: seconds_to_millis(raw.granted_on),
                    granted_by: identity(raw.by),
                })
                .collect(),
            comments: self
                .comments
                .unwrap_or_default()
                .into_iter()
                .map(|raw| PatchSetComment {
                    file: raw.file.unwrap_or_default(),
                    line: to_u32(raw.line),
                    reviewer: identity(raw.reviewer),
                    message: raw.message.unwrap_or_default(),
                    timestamp: created_on,
                })
                .collect(),
            size_insertions: self.size_insertions,
            size_deletions: self.size_deletions,
        }
    }
}

/// Gerrit reports a kind from 2.9 on; older data is all rework
fn patch_set_kind(kind: Option<&str>, version: &GerritVersion) -> PatchSetKind {
    match kind.filter(|kind| !kind.is_empty()) {
        Some(kind) => kind.parse().unwrap_or_else(|e| {
            log::warn!("{}", e);
            PatchSetKind::Rework
        }),
        None => {
            if version.is_at_least(2, 9) {
                log::warn!("Patch set kind missing from Gerrit {} data", version);
            }
            PatchSetKind::Rework
        }
    }
}

/// Gerrit reports epoch seconds; values that do not fit in milliseconds become 0
fn seconds_to_millis(seconds: i64) -> i64 {
    seconds.checked_mul(SEC_TO_MSEC).unwrap_or_else(|| {
        log::warn!("Timestamp {} out of range, using 0", seconds);
        0
    })
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Integer from a JSON number or numeric string; anything else is 0
fn lenient_i64_value(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_i64_value(&value))
}
