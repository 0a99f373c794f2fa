//! FFI use-case API for the Flutter activity screen.
//!
//! # Responsibility
//! - Expose the activity store operations to Dart via FRB.
//! - Own the single process-wide activity session and its async runtime.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The session is created lazily on first use and reused until closed.
//! - Mutations return before their snapshot write completes.

use activity_core::{
    core_version as core_version_inner, format_date, init_logging as init_logging_inner,
    parse_date, ping as ping_inner, Activity, ActivityConfig, ActivityId, ActivityStore,
    FieldValue, FieldValues, SqliteGateway, FIELD_DATE, FIELD_DURATION, FIELD_TYPE,
};
use log::warn;
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::runtime::Runtime;

type Session = ActivityStore<SqliteGateway>;

static CONFIG: OnceLock<ActivityConfig> = OnceLock::new();
static RUNTIME: OnceLock<Runtime> = OnceLock::new();
static SESSION: Mutex<Option<Session>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One activity row for list display.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityItem {
    /// Stable activity ID in string form.
    pub id: String,
    pub kind: String,
    pub duration_minutes: f64,
    /// `YYYY-MM-DD`, ready to pre-fill a date input.
    pub date: String,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityListResponse {
    pub ok: bool,
    /// Activities in display order.
    pub items: Vec<ActivityItem>,
    pub message: String,
}

/// Generic action response envelope for add/update/remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected activity ID.
    pub activity_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActivityActionResponse {
    fn success(message: impl Into<String>, activity_id: ActivityId) -> Self {
        Self {
            ok: true,
            activity_id: Some(activity_id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            activity_id: None,
            message: message.into(),
        }
    }
}

/// Lists activities of the current session, loading storage on first use.
#[flutter_rust_bridge::frb(sync)]
pub fn activity_list() -> ActivityListResponse {
    match with_session(|store| Ok(store.list().iter().map(to_item).collect::<Vec<_>>())) {
        Ok(items) => {
            let message = format!("{} activit{}.", items.len(), plural(items.len()));
            ActivityListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => ActivityListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("activity_list failed: {err}"),
        },
    }
}

/// Appends an activity from raw dialog input.
///
/// # FFI contract
/// - `duration` and `date` are raw input strings; invalid values are rejected
///   with a message naming the failing fields.
#[flutter_rust_bridge::frb(sync)]
pub fn activity_add(kind: String, duration: String, date: String) -> ActivityActionResponse {
    let values = raw_fields(kind, duration, date);
    let result = with_session(|store| {
        store
            .add_from_fields(&values)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(id) => ActivityActionResponse::success("Activity added.", id),
        Err(err) => ActivityActionResponse::failure(format!("activity_add failed: {err}")),
    }
}

/// Replaces the fields of activity `id` from raw dialog input.
#[flutter_rust_bridge::frb(sync)]
pub fn activity_update(
    id: String,
    kind: String,
    duration: String,
    date: String,
) -> ActivityActionResponse {
    let values = raw_fields(kind, duration, date);
    let result = parse_id(&id).and_then(|id| {
        with_session(|store| {
            store
                .update_from_fields(id, &values)
                .map(|()| id)
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(id) => ActivityActionResponse::success("Activity updated.", id),
        Err(err) => ActivityActionResponse::failure(format!("activity_update failed: {err}")),
    }
}

/// Removes activity `id`. Removing an unknown id succeeds without changes.
#[flutter_rust_bridge::frb(sync)]
pub fn activity_remove(id: String) -> ActivityActionResponse {
    let result = parse_id(&id).and_then(|id| with_session(|store| Ok((id, store.remove(id)))));
    match result {
        Ok((id, true)) => ActivityActionResponse::success("Activity removed.", id),
        Ok((id, false)) => ActivityActionResponse::success("Activity was already removed.", id),
        Err(err) => ActivityActionResponse::failure(format!("activity_remove failed: {err}")),
    }
}

/// Normalizes a raw date string to `YYYY-MM-DD`; empty when unparsable.
#[flutter_rust_bridge::frb(sync)]
pub fn activity_format_date(raw: String) -> String {
    parse_date(&raw).map(format_date).unwrap_or_default()
}

/// Waits for pending writes and reports the newest write result.
///
/// Returns empty string when everything is persisted.
#[flutter_rust_bridge::frb(sync)]
pub fn activity_flush() -> String {
    let result = with_session(|store| {
        let runtime = runtime()?;
        runtime.block_on(store.flush()).map_err(|err| err.to_string())
    });
    match result {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Ends the current session after draining its writes.
///
/// The next call to any activity function starts a new session.
#[flutter_rust_bridge::frb(sync)]
pub fn activity_close_session() -> String {
    let session = match SESSION.lock() {
        Ok(mut guard) => guard.take(),
        Err(_) => return "activity session lock poisoned".to_string(),
    };
    let Some(store) = session else {
        return String::new();
    };
    match runtime() {
        Ok(runtime) => match runtime.block_on(store.close()) {
            Ok(()) => String::new(),
            Err(err) => err.to_string(),
        },
        Err(err) => err,
    }
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> Result<T, String>) -> Result<T, String> {
    let mut guard = SESSION
        .lock()
        .map_err(|_| "activity session lock poisoned".to_string())?;
    if guard.is_none() {
        *guard = Some(start_session()?);
    }
    match guard.as_mut() {
        Some(store) => f(store),
        None => Err("activity session unavailable".to_string()),
    }
}

fn start_session() -> Result<Session, String> {
    let config = CONFIG.get_or_init(ActivityConfig::from_env);
    let gateway = Arc::new(SqliteGateway::new(&config.db_path));
    runtime()?
        .block_on(ActivityStore::initialize(gateway))
        .map_err(|err| {
            warn!("event=session_start module=ffi status=error error={err}");
            format!("activity storage unavailable: {err}")
        })
}

fn runtime() -> Result<&'static Runtime, String> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("activity-writer")
        .enable_all()
        .build()
        .map_err(|err| format!("failed to start async runtime: {err}"))?;
    Ok(RUNTIME.get_or_init(|| runtime))
}

fn parse_id(raw: &str) -> Result<ActivityId, String> {
    ActivityId::from_str(raw.trim()).map_err(|_| format!("invalid activity id `{raw}`"))
}

fn raw_fields(kind: String, duration: String, date: String) -> FieldValues {
    FieldValues::from([
        (FIELD_TYPE.to_string(), FieldValue::Text(kind)),
        (FIELD_DURATION.to_string(), FieldValue::Text(duration)),
        (FIELD_DATE.to_string(), FieldValue::Text(date)),
    ])
}

fn to_item(activity: &Activity) -> ActivityItem {
    ActivityItem {
        id: activity.id.to_string(),
        kind: activity.kind.clone(),
        duration_minutes: activity.duration_minutes,
        date: format_date(activity.date),
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

#[cfg(test)]
mod tests {
    use super::{
        activity_add, activity_flush, activity_format_date, activity_list, activity_remove,
        activity_update, core_version, init_logging, ping,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn format_date_normalizes_or_returns_empty() {
        assert_eq!(activity_format_date("2024-03-05T10:00:00Z".to_string()), "2024-03-05");
        assert_eq!(activity_format_date("nope".to_string()), "");
    }

    #[test]
    fn add_update_remove_round_trip_through_session() {
        let kind = unique_token("ffi-run");
        let added = activity_add(kind.clone(), "30".to_string(), "2024-01-01".to_string());
        assert!(added.ok, "{}", added.message);
        let id = added.activity_id.clone().expect("add should return id");

        let listed = activity_list();
        let item = listed
            .items
            .iter()
            .find(|item| item.id == id)
            .expect("added activity should be listed");
        assert_eq!(item.kind, kind);
        assert_eq!(item.date, "2024-01-01");

        let updated = activity_update(
            id.clone(),
            kind.clone(),
            "45".to_string(),
            "2024-02-02".to_string(),
        );
        assert!(updated.ok, "{}", updated.message);
        let listed = activity_list();
        let item = listed.items.iter().find(|item| item.id == id).unwrap();
        assert_eq!(item.duration_minutes, 45.0);

        let removed = activity_remove(id.clone());
        assert!(removed.ok, "{}", removed.message);
        assert!(!activity_list().items.iter().any(|item| item.id == id));
        assert_eq!(activity_flush(), "");
    }

    #[test]
    fn add_rejects_invalid_duration() {
        let response = activity_add(
            "Run".to_string(),
            "abc".to_string(),
            "2024-01-01".to_string(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("duration"));
    }

    #[test]
    fn update_rejects_malformed_and_unknown_ids() {
        let malformed = activity_update(
            "not-a-uuid".to_string(),
            "Run".to_string(),
            "1".to_string(),
            "2024-01-01".to_string(),
        );
        assert!(!malformed.ok);
        assert!(malformed.message.contains("invalid activity id"));

        let unknown = activity_update(
            "00000000-0000-4000-8000-000000000000".to_string(),
            "Run".to_string(),
            "1".to_string(),
            "2024-01-01".to_string(),
        );
        assert!(!unknown.ok);
        assert!(unknown.message.contains("not found"));
    }

    #[test]
    fn rejected_update_leaves_activity_unchanged() {
        let kind = unique_token("ffi-swim");
        let added = activity_add(kind.clone(), "20".to_string(), "2024-03-03".to_string());
        let id = added.activity_id.expect("add should return id");

        let rejected = activity_update(
            id.clone(),
            "Changed".to_string(),
            "not a number".to_string(),
            "2024-04-04".to_string(),
        );
        assert!(!rejected.ok);
        assert!(rejected.message.contains("duration"));

        let listed = activity_list();
        let item = listed.items.iter().find(|item| item.id == id).unwrap();
        assert_eq!(item.kind, kind);
        assert_eq!(item.duration_minutes, 20.0);
        assert_eq!(item.date, "2024-03-03");
        assert!(activity_remove(id).ok);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
