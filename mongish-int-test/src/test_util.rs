use chrono::{DateTime, Utc};
use mongish::collection::{CreateOptions, Document, MongishCollection};
use mongish::common::{Value, DOC_ID};
use mongish::doc;
use mongish::errors::{MongishError, MongishResult};
use mongish::store::{unique_index, IndexSpec};
use mongish::{CollectionConfig, Mongish};
use std::any::Any;
use std::backtrace::Backtrace;
use std::thread;
use std::time::{Duration, Instant};

const MAX_ATTEMPTS: u32 = 3;

/// Runs a test with retry logic and error handling.
///
/// `before` builds a fresh context for every attempt and `after` always runs,
/// even when the test body fails. Panics inside any of the three are caught
/// and count as a failed attempt.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> MongishResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> MongishResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> MongishResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let mut failure = AttemptFailure::default();

    for attempt in 1..=MAX_ATTEMPTS {
        let started = Instant::now();
        let outcome = std::panic::catch_unwind(|| run_attempt(&before, &test, &after));

        failure = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(failure)) => failure,
            Err(payload) => AttemptFailure {
                message: format!("Panic: {}", panic_message(payload.as_ref())),
                backtrace: Backtrace::capture().to_string(),
            },
        };

        if attempt < MAX_ATTEMPTS {
            eprintln!(
                "\n===== mongish test attempt {}/{} failed after {:?} =====\n{}",
                attempt,
                MAX_ATTEMPTS,
                started.elapsed(),
                failure.message
            );
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
    }

    eprintln!("\n===== mongish test failed after {} attempts =====", MAX_ATTEMPTS);
    eprintln!("Last error: {}", failure.message);
    if !failure.backtrace.is_empty() && !failure.backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", failure.backtrace);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_ATTEMPTS, failure.message
    );
}

#[derive(Default)]
struct AttemptFailure {
    message: String,
    backtrace: String,
}

fn run_attempt<T, B, A>(before: &B, test: &T, after: &A) -> Result<(), AttemptFailure>
where
    T: Fn(TestContext) -> MongishResult<()>,
    B: Fn() -> MongishResult<TestContext>,
    A: Fn(TestContext) -> MongishResult<()>,
{
    let failed = |stage: &str, err: MongishError| AttemptFailure {
        message: format!("{} failed: {:?}", stage, err),
        backtrace: Backtrace::capture().to_string(),
    };

    let ctx = before().map_err(|e| failed("Before run", e))?;
    match test(ctx.clone()) {
        Ok(()) => after(ctx).map_err(|e| failed("After run", e)),
        Err(e) => {
            // close regardless, the test error is the one reported
            let _ = after(ctx);
            Err(failed("Test", e))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "Unknown panic".to_string())
}

#[derive(Clone)]
pub struct TestContext {
    db: Mongish,
}

impl TestContext {
    pub fn new(db: Mongish) -> Self {
        Self { db }
    }

    pub fn db(&self) -> Mongish {
        self.db.clone()
    }

    pub fn users(&self) -> MongishResult<MongishCollection> {
        self.db.collection("user")
    }
}

/// A connection with `user`, `post`, `child` and `category` collections.
///
/// `user` carries a sparse unique index on `primaryEmail` and a sparse unique
/// index on `username`.
pub fn create_test_context() -> MongishResult<TestContext> {
    let db = Mongish::builder().ensure_indexes(true).open()?;
    db.add(
        "user",
        CollectionConfig::new()
            .index(unique_index("primaryEmail").sparse(true))
            .index(unique_index("username").sparse(true)),
    )?;
    db.add("post", CollectionConfig::new())?;
    db.add("child", CollectionConfig::new())?;
    db.add(
        "category",
        CollectionConfig::new().index(IndexSpec::new(&["owner", "slug"]).unique(true)),
    )?;
    Ok(TestContext::new(db))
}

pub fn cleanup(ctx: TestContext) -> MongishResult<()> {
    log::debug!("Closing test database with collections {:?}", ctx.db().collection_names());
    ctx.db().close()
}

/// A unique, syntactically valid email address.
pub fn random_email() -> String {
    format!("{}@example.com", uuid::Uuid::new_v4().simple())
}

pub fn create_user(ctx: &TestContext, username: &str) -> MongishResult<Document> {
    ctx.users()?.create(
        doc! { username: username, primaryEmail: (random_email()) },
        CreateOptions::new(),
    )
}

pub fn id_of(document: &Document) -> Value {
    document.get(DOC_ID)
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
